use thiserror::Error;

use crate::builder::BuildState;

/// DEM生成の失敗種別
#[derive(Error, Debug)]
pub enum DemError {
    #[error("Capability '{name}' is unavailable: {message}")]
    CapabilityUnavailable { name: String, message: String },

    #[error("Input feature class not found: {0}")]
    InputNotFound(String),

    #[error("'{field}' was not found in {dataset}. Available fields are: {}", .available.join(", "))]
    FieldNotFound {
        field: String,
        dataset: String,
        available: Vec<String>,
    },

    #[error("Error with TopoToRaster: {0}")]
    Interpolation(String),

    #[error("Error saving DEM: {0}")]
    Save(String),

    #[error("Builder is in state {0:?}; a build can only start from Unvalidated")]
    InvalidState(BuildState),
}

impl DemError {
    /// stderrに出す失敗種別名
    pub fn kind(&self) -> &'static str {
        match self {
            DemError::CapabilityUnavailable { .. } => "CapabilityUnavailableError",
            DemError::InputNotFound(_) => "InputNotFoundError",
            DemError::FieldNotFound { .. } => "FieldNotFoundError",
            DemError::Interpolation(_) => "InterpolationError",
            DemError::Save(_) => "SaveError",
            DemError::InvalidState(_) => "InvalidStateError",
        }
    }
}

/// ジオプロセシングエンジン側のエラー
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn msg(message: impl Into<String>) -> Self {
        EngineError::Message(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DemError>;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::engine::{GeoprocessingEngine, TopoInput};
use crate::error::{DemError, Result};

/// 補間に必要なエンジン拡張機能
pub const SPATIAL_CAPABILITY: &str = "Spatial";

/// ビルドの進行状態（失敗時は直前の状態に留まる）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Unvalidated,
    Validated,
    Interpolated,
    Saved,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub state: BuildState,
    pub elapsed: Duration,
}

/// 入力を検証し、エンジンで補間して保存する
pub struct DemBuilder<E: GeoprocessingEngine> {
    engine: E,
    state: BuildState,
}

impl<E: GeoprocessingEngine> DemBuilder<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: BuildState::Unvalidated,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn build(
        &mut self,
        contour_dataset: &str,
        elevation_field: &str,
        output_path: &Path,
    ) -> Result<BuildReport> {
        if self.state != BuildState::Unvalidated {
            return Err(DemError::InvalidState(self.state));
        }

        let start_time = Instant::now();

        // 既存の出力ファイルは上書き
        self.engine.set_overwrite_output(true);

        self.engine
            .checkout_capability(SPATIAL_CAPABILITY)
            .map_err(|e| {
                error!("Capability checkout failed: {}", e);
                DemError::CapabilityUnavailable {
                    name: SPATIAL_CAPABILITY.to_string(),
                    message: e.to_string(),
                }
            })?;

        self.validate(contour_dataset, elevation_field)?;
        self.state = BuildState::Validated;
        info!(
            "Validated input: {} (field: {})",
            contour_dataset, elevation_field
        );

        let inputs = [TopoInput::contour(contour_dataset, elevation_field)];
        info!("Interpolating surface from contours, this may take a while");
        let dem = self
            .engine
            .interpolate_from_contours(&inputs)
            .map_err(|e| DemError::Interpolation(e.to_string()))?;
        self.state = BuildState::Interpolated;
        info!("Interpolation finished in {:?}", start_time.elapsed());

        self.engine
            .save_raster(&dem, output_path)
            .map_err(|e| DemError::Save(e.to_string()))?;
        drop(dem);
        self.state = BuildState::Saved;
        info!("Written DEM: {:?}", output_path);

        Ok(BuildReport {
            output_path: output_path.to_path_buf(),
            state: self.state,
            elapsed: start_time.elapsed(),
        })
    }

    fn validate(&self, contour_dataset: &str, elevation_field: &str) -> Result<()> {
        if !self.engine.dataset_exists(contour_dataset) {
            return Err(DemError::InputNotFound(contour_dataset.to_string()));
        }

        let field_names = self
            .engine
            .list_fields(contour_dataset)
            .map_err(|e| DemError::InputNotFound(format!("{} ({})", contour_dataset, e)))?;

        if !field_names.iter().any(|name| name == elevation_field) {
            return Err(DemError::FieldNotFound {
                field: elevation_field.to_string(),
                dataset: contour_dataset.to_string(),
                available: field_names,
            });
        }

        Ok(())
    }
}

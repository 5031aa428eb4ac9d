use std::fmt;
use std::path::Path;

use crate::error::EngineError;

/// 補間入力の種別タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoInputKind {
    PointElevation,
    Contour,
    Stream,
    Sink,
    Boundary,
    Lake,
    Cliff,
    Exclusion,
    Coast,
}

impl TopoInputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopoInputKind::PointElevation => "PointElevation",
            TopoInputKind::Contour => "Contour",
            TopoInputKind::Stream => "Stream",
            TopoInputKind::Sink => "Sink",
            TopoInputKind::Boundary => "Boundary",
            TopoInputKind::Lake => "Lake",
            TopoInputKind::Cliff => "Cliff",
            TopoInputKind::Exclusion => "Exclusion",
            TopoInputKind::Coast => "Coast",
        }
    }
}

impl fmt::Display for TopoInputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 補間に渡す1レイヤー分の指定 (dataset, field, type)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoInput {
    pub dataset: String,
    pub field: String,
    pub kind: TopoInputKind,
}

impl TopoInput {
    pub fn contour(dataset: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            field: field.into(),
            kind: TopoInputKind::Contour,
        }
    }
}

/// 外部ジオプロセシングエンジン
///
/// 補間処理とラスター形式は実装側が持ち、[`crate::DemBuilder`] は呼び出し順序だけを管理する
pub trait GeoprocessingEngine {
    /// 補間結果のサーフェス（保存後に解放）
    type Raster;

    fn set_overwrite_output(&mut self, overwrite: bool);

    /// プロセス全体のライセンス/拡張機能のチェックアウト（明示的な解放はしない）
    fn checkout_capability(&mut self, name: &str) -> Result<(), EngineError>;

    fn dataset_exists(&self, dataset: &str) -> bool;

    fn list_fields(&self, dataset: &str) -> Result<Vec<String>, EngineError>;

    fn interpolate_from_contours(&self, inputs: &[TopoInput])
        -> Result<Self::Raster, EngineError>;

    fn save_raster(&self, raster: &Self::Raster, output_path: &Path) -> Result<(), EngineError>;
}

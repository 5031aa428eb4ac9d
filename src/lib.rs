pub mod builder;
pub mod engine;
pub mod error;
pub mod gdal_engine;
pub mod grid;
pub mod writer;

pub use builder::{BuildReport, BuildState, DemBuilder, SPATIAL_CAPABILITY};
pub use engine::{GeoprocessingEngine, TopoInput, TopoInputKind};
pub use error::{DemError, EngineError};
pub use gdal_engine::GdalEngine;
pub use grid::GridConfig;
pub use writer::RasterWriter;

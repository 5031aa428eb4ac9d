use gdal::vector::LayerAccess;
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags};
use std::path::Path;
use tracing::{debug, info};

use crate::builder::SPATIAL_CAPABILITY;
use crate::engine::{GeoprocessingEngine, TopoInput, TopoInputKind};
use crate::error::EngineError;
use crate::grid::{grid_layer, GridConfig};
use crate::writer::RasterWriter;

/// GDALを補間エンジンとして使う実装
pub struct GdalEngine {
    config: GridConfig,
    overwrite: bool,
    checked_out: Vec<String>,
}

impl GdalEngine {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            overwrite: false,
            checked_out: Vec::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn overwrite_output(&self) -> bool {
        self.overwrite
    }

    /// データセット参照をベクターデータセットとレイヤー名に解決する
    ///
    /// まずパス全体を開いて先頭レイヤーを使い、開けなければ最後の要素を
    /// 親コンテナ内のレイヤー名として扱う（例: `contours.gpkg/Elev_Contours`）
    pub fn resolve(&self, dataset: &str) -> Result<(Dataset, String), EngineError> {
        let path = Path::new(dataset);

        if let Ok(ds) = open_vector(path) {
            let layer_name = ds.layers().next().map(|layer| layer.name());
            if let Some(layer_name) = layer_name {
                return Ok((ds, layer_name));
            }
            return Err(EngineError::msg(format!("{} has no layers", dataset)));
        }

        let (parent, layer_name) = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                (parent, name.to_string_lossy().into_owned())
            }
            _ => return Err(EngineError::msg(format!("Cannot open {}", dataset))),
        };

        let ds = open_vector(parent)?;
        ds.layer_by_name(&layer_name)?;
        Ok((ds, layer_name))
    }
}

impl Default for GdalEngine {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

fn open_vector(path: &Path) -> Result<Dataset, EngineError> {
    let options = DatasetOptions {
        open_flags: GdalOpenFlags::GDAL_OF_VECTOR,
        ..Default::default()
    };
    Ok(Dataset::open_ex(path, options)?)
}

impl GeoprocessingEngine for GdalEngine {
    type Raster = Dataset;

    fn set_overwrite_output(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    fn checkout_capability(&mut self, name: &str) -> Result<(), EngineError> {
        if self.checked_out.iter().any(|c| c == name) {
            return Ok(());
        }
        if name != SPATIAL_CAPABILITY {
            return Err(EngineError::msg(format!("Unknown capability: {}", name)));
        }

        // グリッド補間と保存に必要なドライバーを確認
        for driver in ["MEM", self.config.output_format.as_str()] {
            DriverManager::get_driver_by_name(driver).map_err(|e| {
                EngineError::msg(format!("GDAL driver {} is not registered: {}", driver, e))
            })?;
        }

        info!("Checked out capability: {}", name);
        self.checked_out.push(name.to_string());
        Ok(())
    }

    fn dataset_exists(&self, dataset: &str) -> bool {
        match self.resolve(dataset) {
            Ok(_) => true,
            Err(e) => {
                debug!("Dataset {} not resolved: {}", dataset, e);
                false
            }
        }
    }

    fn list_fields(&self, dataset: &str) -> Result<Vec<String>, EngineError> {
        let (ds, layer_name) = self.resolve(dataset)?;
        let layer = ds.layer_by_name(&layer_name)?;
        let defn = layer.defn();

        let mut fields: Vec<String> = defn
            .geom_fields()
            .map(|field| field.name())
            .filter(|name| !name.is_empty())
            .collect();
        fields.extend(defn.fields().map(|field| field.name()));
        Ok(fields)
    }

    fn interpolate_from_contours(&self, inputs: &[TopoInput]) -> Result<Dataset, EngineError> {
        let input = match inputs {
            [input] => input,
            _ => {
                return Err(EngineError::msg(format!(
                    "GDAL grid accepts a single input layer, got {}",
                    inputs.len()
                )))
            }
        };

        match input.kind {
            TopoInputKind::Contour | TopoInputKind::PointElevation => {}
            other => {
                return Err(EngineError::msg(format!(
                    "Input type {} is not supported by GDAL grid",
                    other
                )))
            }
        }

        let (ds, layer_name) = self.resolve(&input.dataset)?;
        info!(
            "Gridding layer {} on field {} ({})",
            layer_name, input.field, input.kind
        );
        grid_layer(&ds, &layer_name, &input.field, &self.config)
    }

    fn save_raster(&self, raster: &Dataset, output_path: &Path) -> Result<(), EngineError> {
        RasterWriter::new(&self.config.output_format)
            .overwrite(self.overwrite)
            .write(raster, output_path)
    }
}

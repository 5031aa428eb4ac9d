use gdal::cpl::CslStringList;
use gdal::{Dataset, Driver, DriverManager, Metadata};
use std::fs;
use std::path::Path;

use crate::error::EngineError;

/// 補間結果のラスターをファイルに保存する
pub struct RasterWriter {
    format: String,
    overwrite: bool,
}

impl Default for RasterWriter {
    fn default() -> Self {
        Self::new("GTiff")
    }
}

impl RasterWriter {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            overwrite: true,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn write(&self, raster: &Dataset, output_path: &Path) -> Result<(), EngineError> {
        let driver = DriverManager::get_driver_by_name(&self.format).map_err(|e| {
            EngineError::msg(format!("Failed to get {} driver: {}", self.format, e))
        })?;

        if output_path.exists() {
            if !self.overwrite {
                return Err(EngineError::msg(format!(
                    "Output already exists and overwrite is disabled: {}",
                    output_path.display()
                )));
            }
            tracing::info!("Overwriting existing output: {:?}", output_path);
            remove_existing(&driver, output_path)?;
        }

        let (cols, rows) = raster.raster_size();
        tracing::info!(
            "Writing {} raster: {} x {} pixels",
            self.format,
            cols,
            rows
        );

        let mut dataset = raster.create_copy(&driver, output_path, &CslStringList::new())?;

        // メタデータを設定
        dataset.set_metadata_item("SOURCE", "contour-dem", "")?;

        Ok(())
    }
}

/// 既存の出力をサイドカーファイル（.hdr, .aux.xml など）ごと削除する
fn remove_existing(driver: &Driver, output_path: &Path) -> Result<(), EngineError> {
    if let Err(e) = driver.delete(output_path) {
        // GDALで開けないファイルは本体だけ削除
        tracing::debug!("GDAL delete failed for {:?}: {}", output_path, e);
    }
    if output_path.exists() {
        fs::remove_file(output_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdal::raster::Buffer;
    use tempfile::TempDir;

    fn drivers_available() -> bool {
        DriverManager::get_driver_by_name("GTiff").is_ok()
            && DriverManager::get_driver_by_name("MEM").is_ok()
    }

    fn create_test_raster() -> Dataset {
        let driver = DriverManager::get_driver_by_name("MEM").unwrap();
        let dataset = driver
            .create_with_band_type::<f32, _>("", 3, 2, 1)
            .unwrap();
        let mut band = dataset.rasterband(1).unwrap();
        let mut buffer = Buffer::new((3, 2), vec![100.0f32, 101.0, 102.0, 103.0, 104.0, 105.0]);
        band.write((0, 0), (3, 2), &mut buffer).unwrap();
        drop(band);
        dataset
    }

    #[test]
    fn test_write_geotiff() {
        if !drivers_available() {
            eprintln!("Skipping test: GTiff/MEM driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("dem.tif");

        let raster = create_test_raster();
        RasterWriter::default().write(&raster, &output_path).unwrap();

        assert!(output_path.exists());
        let dataset = Dataset::open(&output_path).unwrap();
        assert_eq!(dataset.raster_size(), (3, 2));
        assert_eq!(dataset.raster_count(), 1);
    }

    #[test]
    fn test_overwrite_existing_output() {
        if !drivers_available() {
            eprintln!("Skipping test: GTiff/MEM driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("dem.tif");
        fs::write(&output_path, b"stale").unwrap();

        let raster = create_test_raster();
        RasterWriter::default().write(&raster, &output_path).unwrap();

        let dataset = Dataset::open(&output_path).unwrap();
        assert_eq!(dataset.raster_size(), (3, 2));
    }

    #[test]
    fn test_overwrite_removes_sidecar_files() {
        if !drivers_available() || DriverManager::get_driver_by_name("ENVI").is_err() {
            eprintln!("Skipping test: ENVI/MEM driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("dem.img");

        let raster = create_test_raster();
        RasterWriter::new("ENVI").write(&raster, &output_path).unwrap();
        let files_after_first = fs::read_dir(temp_dir.path()).unwrap().count();
        assert!(files_after_first >= 2, "ENVI should write a header next to the data");

        let driver = DriverManager::get_driver_by_name("ENVI").unwrap();
        remove_existing(&driver, &output_path).unwrap();
        assert!(!output_path.exists());
        assert!(!temp_dir.path().join("dem.hdr").exists());
        assert!(!temp_dir.path().join("dem.img.hdr").exists());

        // 上書き後もファイル数は変わらない
        RasterWriter::new("ENVI").write(&raster, &output_path).unwrap();
        RasterWriter::new("ENVI").write(&raster, &output_path).unwrap();
        assert_eq!(
            fs::read_dir(temp_dir.path()).unwrap().count(),
            files_after_first
        );
    }

    #[test]
    fn test_existing_output_without_overwrite() {
        if !drivers_available() {
            eprintln!("Skipping test: GTiff/MEM driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("dem.tif");
        fs::write(&output_path, b"stale").unwrap();

        let raster = create_test_raster();
        let err = RasterWriter::default()
            .overwrite(false)
            .write(&raster, &output_path)
            .unwrap_err();

        assert!(err.to_string().contains("overwrite is disabled"));
        assert_eq!(fs::read(&output_path).unwrap(), b"stale");
    }

    #[test]
    fn test_unknown_format() {
        if !drivers_available() {
            eprintln!("Skipping test: GTiff/MEM driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("dem.xyz");

        let raster = create_test_raster();
        let err = RasterWriter::new("NoSuchDriver")
            .write(&raster, &output_path)
            .unwrap_err();
        assert!(err.to_string().contains("NoSuchDriver"));
        assert!(!output_path.exists());
    }
}

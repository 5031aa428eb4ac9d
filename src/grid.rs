//! GDALのグリッドユーティリティ（`gdal_grid`）による等高線の補間

use gdal::cpl::CslStringList;
use gdal::Dataset;
use std::ffi::{c_int, CStr, CString};

use crate::error::EngineError;

pub const DEFAULT_ALGORITHM: &str = "invdistnn:power=2.0:radius=1000.0:max_points=12";
pub const DEFAULT_NODATA: f64 = -9999.0;

/// 補間エンジンの設定
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// gdal_grid の `-a` に渡すアルゴリズム指定（`nodata=` は `nodata` から付与）
    pub algorithm: String,
    pub width: usize,
    pub height: usize,
    pub nodata: f64,
    /// 保存時のGDALドライバー名
    pub output_format: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_string(),
            width: 1000,
            height: 1000,
            nodata: DEFAULT_NODATA,
            output_format: "GTiff".to_string(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::msg(format!(
                "Output size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        self.algorithm_spec()?;
        Ok(())
    }

    /// 空セルの埋め値とバンドのNoData値を一致させたアルゴリズム指定
    pub fn algorithm_spec(&self) -> Result<String, EngineError> {
        let algorithm = self.algorithm.trim();
        if algorithm.is_empty() {
            return Err(EngineError::msg("Grid algorithm must not be empty"));
        }

        let given = algorithm
            .split(':')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("nodata"));

        match given {
            None => Ok(format!("{}:nodata={}", algorithm, self.nodata)),
            Some((_, value)) => {
                let value: f64 = value.trim().parse().map_err(|_| {
                    EngineError::msg(format!("Invalid nodata in grid algorithm: {}", value))
                })?;
                if value != self.nodata {
                    return Err(EngineError::msg(format!(
                        "Grid algorithm nodata={} conflicts with output nodata {}",
                        value, self.nodata
                    )));
                }
                Ok(algorithm.to_string())
            }
        }
    }

    fn to_args(&self, layer: &str, z_field: &str) -> Result<Vec<String>, EngineError> {
        Ok(vec![
            "-of".to_string(),
            "MEM".to_string(),
            "-ot".to_string(),
            "Float32".to_string(),
            "-l".to_string(),
            layer.to_string(),
            "-zfield".to_string(),
            z_field.to_string(),
            "-a".to_string(),
            self.algorithm_spec()?,
            "-outsize".to_string(),
            self.width.to_string(),
            self.height.to_string(),
        ])
    }
}

struct GridOptionsWrapper {
    options: *mut gdal_sys::GDALGridOptions,
}

impl GridOptionsWrapper {
    fn new(args: &CslStringList) -> Result<Self, EngineError> {
        let options = unsafe { gdal_sys::GDALGridOptionsNew(args.as_ptr(), core::ptr::null_mut()) };
        if options.is_null() {
            return Err(EngineError::msg(format!(
                "Invalid grid options: {}",
                last_cpl_error()
            )));
        }
        Ok(Self { options })
    }
}

impl Drop for GridOptionsWrapper {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALGridOptionsFree(self.options);
        }
    }
}

fn last_cpl_error() -> String {
    unsafe {
        let msg = gdal_sys::CPLGetLastErrorMsg();
        if msg.is_null() {
            return "unknown GDAL error".to_string();
        }
        CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

/// `src` の1レイヤーを `z_field` で補間し、メモリ上のFloat32データセットを返す
pub fn grid_layer(
    src: &Dataset,
    layer: &str,
    z_field: &str,
    config: &GridConfig,
) -> Result<Dataset, EngineError> {
    config.validate()?;

    let mut args = CslStringList::new();
    for arg in config.to_args(layer, z_field)? {
        args.add_string(&arg)?;
    }
    let opts = GridOptionsWrapper::new(&args)?;

    // MEMドライバーなので出力名は空
    let dest = CString::new("").map_err(|e| EngineError::msg(e.to_string()))?;
    let mut usage_error: c_int = 0;

    tracing::debug!(
        "GDALGrid layer={} zfield={} algorithm={} size={}x{}",
        layer,
        z_field,
        config.algorithm,
        config.width,
        config.height
    );

    let handle = unsafe {
        gdal_sys::GDALGrid(dest.as_ptr(), src.c_dataset(), opts.options, &mut usage_error)
    };

    if usage_error != 0 {
        return Err(EngineError::msg("GDALGrid: invalid arguments"));
    }
    if handle.is_null() {
        return Err(EngineError::msg(format!("GDALGrid failed: {}", last_cpl_error())));
    }

    let dataset = unsafe { Dataset::from_c_dataset(handle) };
    let mut band = dataset.rasterband(1)?;
    band.set_no_data_value(Some(config.nodata))?;
    drop(band);

    Ok(dataset)
}

use anyhow::Result;
use clap::Parser;
use contour_dem::grid::{DEFAULT_ALGORITHM, DEFAULT_NODATA};
use contour_dem::{DemBuilder, GdalEngine, GridConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a DEM from contour lines", long_about = None)]
struct Args {
    /// 等高線フィーチャクラスのパス（例: contours.gpkg/Elev_Contours）
    #[arg(value_name = "CONTOUR_DATASET")]
    contour_dataset: String,

    /// 等高線の標高値を持つフィールド名
    #[arg(value_name = "ELEVATION_FIELD")]
    elevation_field: String,

    /// 出力DEMのパス（例: dem.tif）
    #[arg(value_name = "OUTPUT_DEM")]
    output_dem: PathBuf,

    /// GDALグリッド補間アルゴリズム
    #[arg(long, default_value = DEFAULT_ALGORITHM)]
    algorithm: String,

    /// 出力ラスターの幅（ピクセル）
    #[arg(long, default_value_t = 1000)]
    width: usize,

    /// 出力ラスターの高さ（ピクセル）
    #[arg(long, default_value_t = 1000)]
    height: usize,

    /// 出力GDALドライバー
    #[arg(long, default_value = "GTiff")]
    format: String,

    /// NoData値
    #[arg(long, default_value_t = DEFAULT_NODATA, allow_hyphen_values = true)]
    nodata: f64,
}

impl Args {
    fn grid_config(&self) -> GridConfig {
        GridConfig {
            algorithm: self.algorithm.clone(),
            width: self.width,
            height: self.height,
            nodata: self.nodata,
            output_format: self.format.clone(),
        }
    }
}

fn main() -> ExitCode {
    // ログの初期化
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e
                .downcast_ref::<contour_dem::DemError>()
                .map(|e| e.kind())
                .unwrap_or("Error");
            eprintln!("{}: {:#}", kind, e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let engine = GdalEngine::new(args.grid_config());
    let mut builder = DemBuilder::new(engine);

    let report = builder.build(&args.contour_dataset, &args.elevation_field, &args.output_dem)?;

    // 処理時間を表示
    info!("Total processing time: {:?}", report.elapsed);
    Ok(())
}

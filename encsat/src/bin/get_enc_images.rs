// Build the finer platform classification dataset: one Sentinel-2 crop,
// label file and provenance metadata per retained chart point.
use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use encsat::collect::global_variables::{
    ACQUISITION_LABEL, ENC_JSONS, ENC_JSONS_UPDATED, OUTPUT_ROOT, SATLAS_GEOJSON,
};
use encsat::collect::sentinel::SentinelTileCollect;
use encsat::dataset::{DatasetBuilder, EncImagesConfig};
use encsat::geometric::collection::CategoryCollection;
use encsat::geometric::matcher::{intersections, MatchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "get_enc_images",
    about = "Fetch Sentinel-2 crops for ENC platforms into a classification dataset"
)]
struct Args {
    /// Per-category chart GeoJSON used for the samples
    #[arg(long, default_value = ENC_JSONS)]
    enc_dir: PathBuf,

    /// Per-category chart GeoJSON used for matching
    #[arg(long, default_value = ENC_JSONS_UPDATED)]
    match_dir: PathBuf,

    #[arg(long, default_value = SATLAS_GEOJSON)]
    satlas: PathBuf,

    #[arg(long, default_value = OUTPUT_ROOT)]
    output_root: PathBuf,

    /// Mosaic acquisition label
    #[arg(long, default_value = ACQUISITION_LABEL)]
    time: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let matches = intersections(&args.match_dir, &args.satlas, MatchConfig::default())?;
    let chart = CategoryCollection::from_dir(&args.enc_dir)?;

    let config = EncImagesConfig {
        output_root: args.output_root,
        timestamp: args.time.clone(),
        ..EncImagesConfig::default()
    };
    let source = SentinelTileCollect::new(&args.time)?;
    let mut builder = DatasetBuilder::new(source, config);
    let report = builder.run(&chart, &matches)?;

    println!(
        "Samples: {} written, {} beyond boundary, {} without reference match",
        report.samples_written, report.skipped_boundary, report.skipped_unmatched
    );
    println!("Done getting corresponding Satlas images to ENC data");

    Ok(())
}

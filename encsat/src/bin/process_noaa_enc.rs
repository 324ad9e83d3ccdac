// Extract offshore platform points from NOAA ENC (S-57) charts,
// one GeoJSON file per finer category.
//
// example: process_noaa_enc all ./ENC_JSONS/
use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use encsat::collect::global_variables::ENC_ROOT;
use encsat::geometric::chart::{ChartExtractor, ChartTask};

#[derive(Parser, Debug)]
#[command(
    name = "process_noaa_enc",
    about = "Extract per-category platform points from NOAA ENC charts"
)]
struct Args {
    /// Dataset class to extract (e.g. `platform`), or `all`
    task: String,

    /// Directory receiving one GeoJSON file per finer category
    out_dir: PathBuf,

    /// Directory searched recursively for `*.000` chart cells
    #[arg(long, default_value = ENC_ROOT)]
    input_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut extractor = ChartExtractor::new(ChartTask::parse(&args.task));
    extractor.extract_dir(&args.input_dir)?;

    let written = extractor.write(&args.out_dir)?;
    for (category, records) in extractor.collection().iter() {
        println!("{}: {} features", category, records.len());
    }
    println!("Wrote {} files to {:?}", written.len(), args.out_dir);

    Ok(())
}

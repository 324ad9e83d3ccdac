// Match chart-derived platform points against the Satlas reference labels
// and report per-category match counts.
use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use encsat::collect::global_variables::{
    ENC_JSONS_UPDATED, MATCH_DECIMALS, MATCH_THRESHOLD, SATLAS_GEOJSON,
};
use encsat::geometric::matcher::{intersections, MatchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "intersect_satlas_enc",
    about = "Match ENC platform points against the Satlas reference dataset"
)]
struct Args {
    /// Directory of per-category chart GeoJSON files
    #[arg(long, default_value = ENC_JSONS_UPDATED)]
    enc_dir: PathBuf,

    /// Reference GeoJSON (only `offshore_platform` features are used)
    #[arg(long, default_value = SATLAS_GEOJSON)]
    satlas: PathBuf,

    /// Decimal places both coordinates must agree to
    #[arg(long, default_value_t = MATCH_DECIMALS)]
    decimals: i32,

    /// Fraction of records reported as the required match count
    #[arg(long, default_value_t = MATCH_THRESHOLD)]
    threshold: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = MatchConfig {
        decimals: args.decimals,
        threshold: args.threshold,
    };
    let table = intersections(&args.enc_dir, &args.satlas, config)?;

    println!("Done Matching!");
    println!("{}", table);

    Ok(())
}

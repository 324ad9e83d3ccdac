use std::path::PathBuf;

/// Root directory scanned recursively for S-57 `*.000` chart cells
pub const ENC_ROOT: &str = "ENC_ROOT";
/// Per-category chart GeoJSON read by the dataset builder
pub const ENC_JSONS: &str = "ENC_JSONS";
/// Per-category chart GeoJSON read by the matcher
pub const ENC_JSONS_UPDATED: &str = "ENC_JSONS_UPDATED";
/// Reference labels (Satlas offshore platforms)
pub const SATLAS_GEOJSON: &str = "satlas.geojson";
/// Output root of the classification dataset
pub const OUTPUT_ROOT: &str = "finer_platform_classification";

pub const SENTINEL2_URL: &str =
    "https://se-tile-api.allen.ai/image_mosaic/sentinel2/[LABEL]/tci/[ZOOM]/[COL]/[ROW].png";
/// Mosaic acquisition label baked into the tile URL and the `timestamp` metadata
pub const ACQUISITION_LABEL: &str = "2024-01";
pub const TILE_ZOOM: u32 = 13;
pub const TILE_SIZE: u32 = 512;
pub const CROP_SIZE: u32 = 64;

/// Features at or west of this longitude are skipped (Alaska is dark in the mosaic)
pub const BOUNDARY_LONGITUDE: f64 = -150.0;

pub const MATCH_DECIMALS: i32 = 3;
pub const MATCH_THRESHOLD: f64 = 0.01;

pub fn get_output_root() -> PathBuf {
    PathBuf::from(OUTPUT_ROOT)
}

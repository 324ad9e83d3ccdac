pub mod collect;
pub mod commons;
pub mod dataset;
pub mod error;
pub mod geo_core;
pub mod geometric;

// Chart extraction (S-57 via GDAL) is behind the "gdal" feature, enabled by default.
// Matching and dataset building work on GeoJSON only and do not need GDAL.

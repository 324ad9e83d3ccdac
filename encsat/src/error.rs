use thiserror::Error;

/// Failures while fetching a single imagery tile
#[derive(Debug, Error)]
pub enum TileError {
    /// Any non-success status other than "not found" / "server error"
    #[error("bad status code {status} for {url}")]
    BadStatus { status: u16, url: String },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode tile image from {url}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Failures while reading a per-category GeoJSON collection
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{path} is not a GeoJSON FeatureCollection")]
    NotAFeatureCollection { path: String },

    #[error("first feature of {path} has no finer_category property")]
    MissingFinerCategory { path: String },
}

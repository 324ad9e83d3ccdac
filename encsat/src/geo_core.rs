use geo::Point;
use geojson::{Feature, Geometry, JsonObject, Value};
use serde_json::Value as JsonValue;
use std::f64::consts::PI;

use crate::geometric::category::COARSE_CATEGORY;

/// A chart or reference feature reduced to a single WGS84 coordinate
/// Serialized as a GeoJSON Point feature with `category` and `finer_category` properties
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Coarse category (always "offshore_platform" for chart output)
    pub category: String,
    /// Most specific category of the structure
    pub finer_category: String,
    /// Representative coordinate (x = longitude, y = latitude)
    /// None when the source geometry could not be reduced to a point
    pub position: Option<Point<f64>>,
}

impl PointRecord {
    /// Create a new chart record in the coarse "offshore_platform" category
    pub fn new(finer_category: impl Into<String>, position: Option<Point<f64>>) -> Self {
        PointRecord {
            category: COARSE_CATEGORY.to_string(),
            finer_category: finer_category.into(),
            position,
        }
    }

    /// Convenience constructor from a longitude/latitude pair
    pub fn at(finer_category: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self::new(finer_category, Some(Point::new(lon, lat)))
    }

    pub fn lon(&self) -> Option<f64> {
        self.position.map(|p| p.x())
    }

    pub fn lat(&self) -> Option<f64> {
        self.position.map(|p| p.y())
    }

    /// Build a record from a GeoJSON feature
    /// Only Point geometries carry a position; anything else yields `position: None`
    pub fn from_feature(feature: &Feature) -> Self {
        let category = string_property(feature, "category").unwrap_or_default();
        let finer_category =
            string_property(feature, "finer_category").unwrap_or_else(|| category.clone());

        let position = feature
            .geometry
            .as_ref()
            .and_then(|geometry| match &geometry.value {
                Value::Point(coords) if coords.len() >= 2 => Some(Point::new(coords[0], coords[1])),
                _ => None,
            });

        PointRecord {
            category,
            finer_category,
            position,
        }
    }

    /// Convert to a GeoJSON feature (null geometry when there is no position)
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert(
            "category".to_string(),
            JsonValue::String(self.category.clone()),
        );
        properties.insert(
            "finer_category".to_string(),
            JsonValue::String(self.finer_category.clone()),
        );

        Feature {
            bbox: None,
            geometry: self
                .position
                .map(|p| Geometry::new(Value::Point(vec![p.x(), p.y()]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

/// Latitude limit of the square web-mercator world
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Convert a WGS84 coordinate to global web-mercator pixel coordinates
/// at `zoom` for square tiles of `tile_size` pixels
/// Returns (column, row) in pixels; divide by `tile_size` to get the tile index
/// Latitudes beyond ±MAX_MERCATOR_LATITUDE are clamped to the map edge
pub fn geo_to_mercator(lon: f64, lat: f64, zoom: u32, tile_size: u32) -> (f64, f64) {
    let n = 2f64.powi(zoom as i32);
    let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let lat_rad = lat * PI / 180.0;

    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    (x * tile_size as f64, y * tile_size as f64)
}

use anyhow::Result;
use geo::{Centroid, Coord, LineString, Point, Polygon};
use geojson::{Feature, Geometry, Value};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[cfg(feature = "gdal")]
use anyhow::Context;
#[cfg(feature = "gdal")]
use gdal::vector::LayerAccess;
#[cfg(feature = "gdal")]
use gdal::Dataset;

use crate::geo_core::PointRecord;
use crate::geometric::category::{finer_category, LAYER_CLASSES};
use crate::geometric::collection::CategoryCollection;

/// Which chart layers to extract
/// `"all"` selects every known layer, otherwise only the layers feeding the named class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTask {
    wanted_layers: Vec<String>,
}

impl ChartTask {
    pub fn parse(task: &str) -> Self {
        let wanted_layers: Vec<String> = LAYER_CLASSES
            .iter()
            .filter(|(_, class)| task == "all" || *class == task)
            .map(|(layer, _)| layer.to_string())
            .collect();

        if wanted_layers.is_empty() {
            warn!("No chart layers belong to class {:?}", task);
        }

        ChartTask { wanted_layers }
    }

    pub fn wants(&self, layer: &str) -> bool {
        self.wanted_layers.iter().any(|l| l == layer)
    }

    pub fn layers(&self) -> &[String] {
        &self.wanted_layers
    }
}

/// Reduce a chart geometry to a single representative coordinate
///
/// - Point: the point itself
/// - Polygon: polygon centroid (holes respected)
/// - LineString: line centroid, logged since platforms are not expected as lines
/// - anything else: centroid if one exists, logged
pub fn representative_coordinate(geometry: &Geometry) -> Option<Point<f64>> {
    match &geometry.value {
        Value::Point(coords) => {
            if coords.len() >= 2 {
                Some(Point::new(coords[0], coords[1]))
            } else {
                warn!("Point with {} coordinates", coords.len());
                None
            }
        }
        Value::Polygon(rings) => {
            let mut rings = rings.iter().map(|ring| line_string(ring));
            let exterior = rings.next()?;
            Polygon::new(exterior, rings.collect()).centroid()
        }
        Value::LineString(coords) => {
            warn!("Invalid Type: LineString");
            line_string(coords).centroid()
        }
        other => {
            warn!("Unexpected geometry type {}", geometry_type_name(other));
            geo::Geometry::<f64>::try_from(other.clone())
                .ok()
                .and_then(|g| g.centroid())
        }
    }
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn line_string(positions: &[Vec<f64>]) -> LineString<f64> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect()
}

/// Groups chart features of the wanted layers into per-category point records
pub struct ChartExtractor {
    task: ChartTask,
    collection: CategoryCollection,
}

impl ChartExtractor {
    pub fn new(task: ChartTask) -> Self {
        ChartExtractor {
            task,
            collection: CategoryCollection::new(),
        }
    }

    pub fn task(&self) -> &ChartTask {
        &self.task
    }

    /// Convert one chart feature into a point record and add it
    pub fn add_feature(&mut self, feature: &Feature) {
        let position = match &feature.geometry {
            Some(geometry) => representative_coordinate(geometry),
            None => {
                warn!("Feature without geometry");
                None
            }
        };
        if position.is_none() {
            warn!("Keeping feature with null geometry");
        }

        let category = finer_category(feature.properties.as_ref());
        self.collection.push(PointRecord::new(category, position));
    }

    /// Add every feature of a layer if the layer is wanted; returns how many were added
    pub fn add_layer(&mut self, layer_name: &str, features: &[Feature]) -> usize {
        if !self.task.wants(layer_name) {
            return 0;
        }
        for feature in features {
            self.add_feature(feature);
        }
        features.len()
    }

    /// Extract every wanted layer of a single S-57 cell
    #[cfg(feature = "gdal")]
    pub fn extract_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let dataset =
            Dataset::open(path).with_context(|| format!("Failed to open chart: {:?}", path))?;

        let wanted: Vec<String> = dataset
            .layers()
            .map(|layer| layer.name())
            .filter(|name| self.task.wants(name))
            .collect();

        let mut added = 0;
        for layer_name in &wanted {
            let features = export_layer(path, layer_name)?;
            added += self.add_layer(layer_name, &features);
        }

        Ok(added)
    }

    /// Extract every `*.000` cell found recursively under `in_dir`
    #[cfg(feature = "gdal")]
    pub fn extract_dir<P: AsRef<Path>>(&mut self, in_dir: P) -> Result<usize> {
        let in_dir = in_dir.as_ref();
        let cells = chart_cells(in_dir)?;
        info!("Found {} chart cells under {:?}", cells.len(), in_dir);

        let mut added = 0;
        for cell in &cells {
            added += self.extract_file(cell)?;
        }

        info!(
            "Extracted {} features into {} categories",
            added,
            self.collection.len()
        );
        Ok(added)
    }

    pub fn collection(&self) -> &CategoryCollection {
        &self.collection
    }

    pub fn into_collection(self) -> CategoryCollection {
        self.collection
    }

    /// Write one GeoJSON file per finer category
    pub fn write<P: AsRef<Path>>(&self, out_dir: P) -> Result<Vec<PathBuf>> {
        let written = self.collection.write_dir(out_dir)?;
        for path in &written {
            info!("Wrote {:?}", path);
        }
        Ok(written)
    }
}

/// S-57 base cells (`*.000`) under `dir`, sorted
pub fn chart_cells<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut cells = Vec::new();
    for entry in walkdir::WalkDir::new(dir.as_ref()) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|ext| ext.to_str()) == Some("000")
        {
            cells.push(entry.into_path());
        }
    }
    cells.sort();
    Ok(cells)
}

/// Export one layer of a chart cell to GeoJSON features with ogr2ogr
#[cfg(feature = "gdal")]
fn export_layer(path: &Path, layer_name: &str) -> Result<Vec<Feature>> {
    use std::process::Command;

    let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
    let temp_geojson = temp_dir.path().join(format!("{}.geojson", layer_name));

    let status = Command::new("ogr2ogr")
        .arg("-f")
        .arg("GeoJSON")
        .arg(&temp_geojson)
        .arg(path)
        .arg(layer_name)
        .status()
        .context("Failed to execute ogr2ogr. Make sure GDAL is installed and ogr2ogr is in PATH")?;

    if !status.success() {
        anyhow::bail!(
            "ogr2ogr failed to export layer {} from {:?}",
            layer_name,
            path
        );
    }

    crate::geometric::collection::read_features(&temp_geojson)
}

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::commons::basic_functions::category_file_stem;
use crate::error::ChartError;
use crate::geo_core::PointRecord;

/// Point records grouped by finer category, in insertion order
#[derive(Debug, Clone, Default)]
pub struct CategoryCollection {
    categories: Vec<(String, Vec<PointRecord>)>,
}

impl CategoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its finer category, creating the category on first use
    pub fn push(&mut self, record: PointRecord) {
        match self
            .categories
            .iter_mut()
            .find(|(name, _)| *name == record.finer_category)
        {
            Some((_, records)) => records.push(record),
            None => self
                .categories
                .push((record.finer_category.clone(), vec![record])),
        }
    }

    /// Set the records of a category, replacing any existing ones in place
    pub fn insert(&mut self, category: impl Into<String>, records: Vec<PointRecord>) {
        let category = category.into();
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => *existing = records,
            None => self.categories.push((category, records)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&[PointRecord]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, records)| records.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PointRecord])> {
        self.categories
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of records across all categories
    pub fn total_records(&self) -> usize {
        self.categories.iter().map(|(_, records)| records.len()).sum()
    }

    /// Load every `*.geojson` file in `dir`, in file-name order
    /// The category of a file is the `finer_category` of its first feature
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {:?}", dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("geojson"))
            .collect();
        paths.sort();

        let mut collection = CategoryCollection::new();
        for path in paths {
            let features = read_features(&path)?;
            let Some(first) = features.first() else {
                warn!("Skipping empty collection {:?}", path);
                continue;
            };

            let category = first
                .property("finer_category")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| ChartError::MissingFinerCategory {
                    path: path.display().to_string(),
                })?;

            if collection.get(&category).is_some() {
                warn!("{:?} replaces earlier records for {:?}", path, category);
            }

            let records = features.iter().map(PointRecord::from_feature).collect();
            collection.insert(category, records);
        }

        info!(
            "Loaded {} categories ({} records) from {:?}",
            collection.len(),
            collection.total_records(),
            dir
        );

        Ok(collection)
    }

    /// Write one pretty-printed FeatureCollection per category into `out_dir`
    /// Returns the written paths
    pub fn write_dir<P: AsRef<Path>>(&self, out_dir: P) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

        let mut written = Vec::with_capacity(self.categories.len());
        for (category, records) in &self.categories {
            let feature_collection = FeatureCollection {
                bbox: None,
                features: records.iter().map(PointRecord::to_feature).collect(),
                foreign_members: None,
            };

            let output_file = out_dir.join(format!("{}.geojson", category_file_stem(category)));
            let geojson_str = serde_json::to_string_pretty(&feature_collection)
                .context("Failed to serialize FeatureCollection")?;
            fs::write(&output_file, geojson_str)
                .with_context(|| format!("Failed to write GeoJSON file: {:?}", output_file))?;

            written.push(output_file);
        }

        Ok(written)
    }
}

/// Read the features of a GeoJSON FeatureCollection file
pub fn read_features<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    let geojson_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
    let geojson: GeoJson = geojson_str
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        _ => Err(ChartError::NotAFeatureCollection {
            path: path.display().to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_push_groups_by_category() {
        let mut collection = CategoryCollection::new();
        collection.push(PointRecord::at("oil derrick/rig", 1.0, 2.0));
        collection.push(PointRecord::at("production platform", 3.0, 4.0));
        collection.push(PointRecord::at("oil derrick/rig", 5.0, 6.0));

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.total_records(), 3);
        assert_eq!(
            collection.category_names(),
            vec!["oil derrick/rig", "production platform"]
        );
        assert_eq!(collection.get("oil derrick/rig").unwrap().len(), 2);
    }

    #[test]
    fn test_write_and_load_dir() {
        let dir = TempDir::new().unwrap();
        let mut collection = CategoryCollection::new();
        collection.push(PointRecord::at("oil derrick/rig", -91.5, 28.1));
        collection.push(PointRecord::at("production platform", -92.0, 27.9));

        let written = collection.write_dir(dir.path()).unwrap();
        assert!(written.contains(&dir.path().join("oil derrick_rig.geojson")));
        assert!(written.contains(&dir.path().join("production platform.geojson")));

        // Non-geojson files are ignored
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let loaded = CategoryCollection::from_dir(dir.path()).unwrap();
        assert_eq!(
            loaded.category_names(),
            vec!["oil derrick/rig", "production platform"]
        );
        let rigs = loaded.get("oil derrick/rig").unwrap();
        assert_eq!(rigs[0].lon(), Some(-91.5));
        assert_eq!(rigs[0].lat(), Some(28.1));
    }

    #[test]
    fn test_load_rejects_missing_finer_category() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("bad.geojson"),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},
                 "geometry":{"type":"Point","coordinates":[0.0,0.0]}}
            ]}"#,
        )
        .unwrap();

        let err = CategoryCollection::from_dir(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<ChartError>().is_some());
    }

    #[test]
    fn test_read_features_requires_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("point.geojson");
        fs::write(&path, r#"{"type":"Point","coordinates":[0.0,0.0]}"#).unwrap();
        assert!(read_features(&path).is_err());
    }
}

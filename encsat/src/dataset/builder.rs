use anyhow::{Context, Result};
use geo::Point;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::collect::global_variables::{
    get_output_root, ACQUISITION_LABEL, BOUNDARY_LONGITUDE, CROP_SIZE, TILE_ZOOM,
};
use crate::collect::sentinel::{load_window, TileSource};
use crate::commons::basic_functions::Progress;
use crate::dataset::sample::{SampleMetadata, SamplePaths};
use crate::geo_core::{geo_to_mercator, PointRecord};
use crate::geometric::category::PlatformClass;
use crate::geometric::collection::CategoryCollection;
use crate::geometric::matcher::MatchTable;

/// Dataset builder settings
#[derive(Debug, Clone)]
pub struct EncImagesConfig {
    pub output_root: PathBuf,
    /// Acquisition label written as the `timestamp` metadata
    pub timestamp: String,
    pub zoom: u32,
    pub crop_size: u32,
    /// Only features strictly east of this longitude are kept
    pub boundary_longitude: f64,
}

impl Default for EncImagesConfig {
    fn default() -> Self {
        EncImagesConfig {
            output_root: get_output_root(),
            timestamp: ACQUISITION_LABEL.to_string(),
            zoom: TILE_ZOOM,
            crop_size: CROP_SIZE,
            boundary_longitude: BOUNDARY_LONGITUDE,
        }
    }
}

/// Whether a chart feature becomes a sample, and why not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    Keep,
    /// At or west of the boundary longitude
    BeyondBoundary,
    /// Restricted category without a reference match
    Unmatched,
}

pub fn retention(class: PlatformClass, lon: f64, intersects: bool, boundary: f64) -> Retention {
    if lon <= boundary {
        Retention::BeyondBoundary
    } else if intersects || !class.requires_reference_match() {
        Retention::Keep
    } else {
        Retention::Unmatched
    }
}

/// Counts from a builder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub samples_written: usize,
    /// At or west of the boundary longitude
    pub skipped_boundary: usize,
    /// Restricted category without a reference match
    pub skipped_unmatched: usize,
    /// Records without coordinates
    pub skipped_no_position: usize,
}

/// Turns chart records into image classification samples
/// Owns the sequential sample id counter
pub struct DatasetBuilder<S: TileSource> {
    source: S,
    config: EncImagesConfig,
    next_id: usize,
}

impl<S: TileSource> DatasetBuilder<S> {
    pub fn new(source: S, config: EncImagesConfig) -> Self {
        DatasetBuilder {
            source,
            config,
            next_id: 0,
        }
    }

    /// Id the next sample will get
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    pub fn config(&self) -> &EncImagesConfig {
        &self.config
    }

    /// Build samples for every accepted category of `chart`, in collection order
    /// A fatal tile error aborts the run; samples already written stay on disk
    pub fn run(&mut self, chart: &CategoryCollection, matches: &MatchTable) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for (category, records) in chart.iter() {
            let Some(class) = PlatformClass::from_finer_category(category) else {
                debug!("Ignoring category {:?}", category);
                continue;
            };

            let progress = Progress::new(records.len(), category);
            for record in records {
                progress.inc();
                self.process_record(class, record, matches, &mut report)?;
            }
            progress.finish();
        }

        info!(
            "Wrote {} samples to {:?}",
            report.samples_written, self.config.output_root
        );
        Ok(report)
    }

    fn process_record(
        &mut self,
        class: PlatformClass,
        record: &PointRecord,
        matches: &MatchTable,
        report: &mut BuildReport,
    ) -> Result<()> {
        let Some(point) = record.position else {
            warn!(
                "Skipping {} record without coordinates",
                class.finer_category()
            );
            report.skipped_no_position += 1;
            return Ok(());
        };

        let intersects = matches.contains(class.finer_category(), point);
        match retention(class, point.x(), intersects, self.config.boundary_longitude) {
            Retention::Keep => {}
            Retention::BeyondBoundary => {
                report.skipped_boundary += 1;
                return Ok(());
            }
            Retention::Unmatched => {
                report.skipped_unmatched += 1;
                return Ok(());
            }
        }

        self.write_sample(class, point, intersects)?;
        report.samples_written += 1;
        Ok(())
    }

    /// Write one sample directory for `point` and advance the id counter
    pub fn write_sample(
        &mut self,
        class: PlatformClass,
        point: Point<f64>,
        intersects: bool,
    ) -> Result<SamplePaths> {
        let id = self.next_id;
        let paths = SamplePaths::new(&self.config.output_root, id);
        paths.create()?;
        paths.write_label(class.label())?;

        let crop = self.fetch_crop(point).with_context(|| {
            format!(
                "Failed to fetch imagery for datapoint_{} at ({}, {})",
                id,
                point.x(),
                point.y()
            )
        })?;

        let metadata = SampleMetadata {
            timestamp: self.config.timestamp.clone(),
            label: class.label(),
            satlas_intersection: intersects,
        };
        paths.write_image(&crop, &metadata)?;

        self.next_id += 1;
        Ok(paths)
    }

    /// Square crop centered on the point's pixel at the configured zoom
    fn fetch_crop(&self, point: Point<f64>) -> Result<image::RgbImage> {
        let (col, row) = geo_to_mercator(
            point.x(),
            point.y(),
            self.config.zoom,
            self.source.tile_size(),
        );
        let half = (self.config.crop_size / 2) as i64;
        load_window(
            &self.source,
            col.trunc() as i64 - half,
            row.trunc() as i64 - half,
            self.config.crop_size,
            self.config.crop_size,
        )
    }
}

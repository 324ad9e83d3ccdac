use anyhow::Result;
use geo::Point;
use log::{info, warn};
use std::fmt;
use std::path::Path;

use crate::collect::global_variables::{MATCH_DECIMALS, MATCH_THRESHOLD};
use crate::commons::basic_functions::{coordinates_match, matches_needed, Progress};
use crate::geo_core::PointRecord;
use crate::geometric::category::{is_matched_category, COARSE_CATEGORY};
use crate::geometric::collection::{read_features, CategoryCollection};

/// Matching parameters
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Coordinates match when both axes differ by less than 10^-decimals
    pub decimals: i32,
    /// Fraction of a category's records reported as the required match count
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            decimals: MATCH_DECIMALS,
            threshold: MATCH_THRESHOLD,
        }
    }
}

/// Per-category match counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySummary {
    /// ceil(threshold * total); reported only, never used as a filter
    pub needed: usize,
    pub matched: usize,
    pub total: usize,
}

/// Chart coordinates that found a reference match, per finer category
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    entries: Vec<(String, Vec<Point<f64>>, CategorySummary)>,
}

impl MatchTable {
    /// Matched chart-side coordinates of a category (empty when unknown)
    pub fn get(&self, category: &str) -> &[Point<f64>] {
        self.entries
            .iter()
            .find(|(name, _, _)| name == category)
            .map(|(_, points, _)| points.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `point` is one of the matched coordinates of `category`
    pub fn contains(&self, category: &str, point: Point<f64>) -> bool {
        self.get(category).iter().any(|p| *p == point)
    }

    pub fn summary(&self, category: &str) -> Option<CategorySummary> {
        self.entries
            .iter()
            .find(|(name, _, _)| name == category)
            .map(|(_, _, summary)| *summary)
    }

    pub fn summaries(&self) -> impl Iterator<Item = (&str, &CategorySummary)> {
        self.entries
            .iter()
            .map(|(name, _, summary)| (name.as_str(), summary))
    }

    pub fn total_matches(&self) -> usize {
        self.entries.iter().map(|(_, points, _)| points.len()).sum()
    }

    fn push(&mut self, category: &str, points: Vec<Point<f64>>, summary: CategorySummary) {
        self.entries.push((category.to_string(), points, summary));
    }
}

impl fmt::Display for MatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, _, summary) in &self.entries {
            writeln!(
                f,
                "{}: needed={} matched={} total={}",
                name, summary.needed, summary.matched, summary.total
            )?;
        }
        write!(f, "total matches: {}", self.total_matches())
    }
}

/// Load the reference dataset, keeping only offshore platform features
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<Vec<PointRecord>> {
    let path = path.as_ref();
    let reference: Vec<PointRecord> = read_features(path)?
        .iter()
        .map(PointRecord::from_feature)
        .filter(|record| record.category == COARSE_CATEGORY)
        .collect();

    info!(
        "Loaded {} reference platforms from {:?}",
        reference.len(),
        path
    );
    Ok(reference)
}

/// Greedy one-to-one matcher between chart records and a reference set
///
/// Chart records are visited in order; each takes the first still-unconsumed
/// reference record within tolerance. Consumed reference records stay consumed
/// across categories, so the result depends on category order.
pub struct CoordinateMatcher {
    reference: Vec<PointRecord>,
    consumed: Vec<bool>,
    config: MatchConfig,
}

impl CoordinateMatcher {
    pub fn new(reference: Vec<PointRecord>, config: MatchConfig) -> Self {
        let consumed = vec![false; reference.len()];
        CoordinateMatcher {
            reference,
            consumed,
            config,
        }
    }

    /// Consumed flag per reference record, in reference order
    pub fn consumed(&self) -> &[bool] {
        &self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.consumed.iter().filter(|c| !**c).count()
    }

    /// Index of the first unconsumed reference record matching `point`
    fn find_match(&self, point: Point<f64>) -> Option<usize> {
        let decimals = self.config.decimals;
        (0..self.reference.len()).find(|&j| {
            !self.consumed[j]
                && self.reference[j]
                    .position
                    .is_some_and(|candidate| coordinates_match(point, candidate, decimals))
        })
    }

    /// Match one category's records, consuming reference records as they pair
    pub fn match_category(&mut self, category: &str, records: &[PointRecord]) -> Vec<Point<f64>> {
        let progress = Progress::new(records.len(), category);
        let mut matched = Vec::new();

        for record in records {
            progress.inc();
            let Some(point) = record.position else {
                warn!("Skipping {} record without coordinates", category);
                continue;
            };
            if let Some(j) = self.find_match(point) {
                self.consumed[j] = true;
                matched.push(point);
            }
        }

        progress.finish();
        matched
    }

    /// Match every category of interest in collection order
    /// Other categories are reported with zero matches
    pub fn run(&mut self, chart: &CategoryCollection) -> MatchTable {
        let mut table = MatchTable::default();

        for (category, records) in chart.iter() {
            let total = records.len();
            let matched = if is_matched_category(category) {
                self.match_category(category, records)
            } else {
                Vec::new()
            };

            let summary = CategorySummary {
                needed: matches_needed(total, self.config.threshold),
                matched: matched.len(),
                total,
            };
            table.push(category, matched, summary);
        }

        info!(
            "Matched {} chart records, {} reference records left",
            table.total_matches(),
            self.remaining()
        );
        table
    }
}

/// Load both datasets from disk and compute the match table
pub fn intersections<P: AsRef<Path>, Q: AsRef<Path>>(
    chart_dir: P,
    reference_path: Q,
    config: MatchConfig,
) -> Result<MatchTable> {
    let chart = CategoryCollection::from_dir(chart_dir)?;
    let reference = load_reference(reference_path)?;
    Ok(CoordinateMatcher::new(reference, config).run(&chart))
}

use geo::Point;

#[cfg(feature = "indicatif")]
use indicatif::{ProgressBar, ProgressStyle};

/// True when both axes differ by strictly less than 10^-decimals
pub fn coordinates_match(a: Point<f64>, b: Point<f64>, decimal_places: i32) -> bool {
    let delta = 1.0 / 10f64.powi(decimal_places);
    (b.x() - a.x()).abs() < delta && (b.y() - a.y()).abs() < delta
}

/// Number of matches a category would need at `threshold` (reporting only)
pub fn matches_needed(total: usize, threshold: f64) -> usize {
    (total as f64 * threshold).ceil() as usize
}

/// File stem for a category name ("oil derrick/rig" -> "oil derrick_rig")
pub fn category_file_stem(category: &str) -> String {
    category.replace('/', "_")
}

#[cfg(feature = "indicatif")]
fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Per-category progress reporting; a no-op without the "indicatif" feature
pub struct Progress {
    #[cfg(feature = "indicatif")]
    bar: ProgressBar,
}

impl Progress {
    pub fn new(len: usize, message: &str) -> Self {
        #[cfg(feature = "indicatif")]
        {
            let bar = ProgressBar::new(len as u64);
            bar.set_style(progress_style());
            bar.set_message(message.to_string());
            Progress { bar }
        }
        #[cfg(not(feature = "indicatif"))]
        {
            let _ = (len, message);
            Progress {}
        }
    }

    pub fn inc(&self) {
        #[cfg(feature = "indicatif")]
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        #[cfg(feature = "indicatif")]
        self.bar.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_match_within_tolerance() {
        let a = Point::new(-90.1234, 28.5678);
        let b = Point::new(-90.1238, 28.5671);
        assert!(coordinates_match(a, b, 3));
        assert!(!coordinates_match(a, b, 4));
    }

    #[test]
    fn test_coordinates_match_is_strict() {
        let a = Point::new(0.0, 0.0);
        assert!(!coordinates_match(a, Point::new(0.001, 0.0), 3));
        assert!(!coordinates_match(a, Point::new(0.0, -0.001), 3));
        assert!(coordinates_match(a, Point::new(0.0009, -0.0009), 3));
    }

    #[test]
    fn test_coordinates_match_needs_both_axes() {
        let a = Point::new(10.0, 10.0);
        assert!(!coordinates_match(a, Point::new(10.0, 10.5), 3));
        assert!(!coordinates_match(a, Point::new(10.5, 10.0), 3));
    }

    #[test]
    fn test_matches_needed() {
        assert_eq!(matches_needed(0, 0.01), 0);
        assert_eq!(matches_needed(1, 0.01), 1);
        assert_eq!(matches_needed(100, 0.01), 1);
        assert_eq!(matches_needed(101, 0.01), 2);
    }

    #[test]
    fn test_category_file_stem() {
        assert_eq!(category_file_stem("oil derrick/rig"), "oil derrick_rig");
        assert_eq!(category_file_stem("mooring tower"), "mooring tower");
    }
}

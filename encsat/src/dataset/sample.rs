use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Text fields embedded in every sample image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    /// Mosaic acquisition label, e.g. "2024-01"
    pub timestamp: String,
    /// Numeric class id
    pub label: u8,
    /// Whether the chart feature also appears in the reference dataset
    pub satlas_intersection: bool,
}

impl SampleMetadata {
    /// Key/value pairs written as PNG tEXt chunks
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let intersection = match self.satlas_intersection {
            true => "True",
            false => "False",
        };
        vec![
            ("timestamp", self.timestamp.clone()),
            ("noaa_enc_label", self.label.to_string()),
            ("satlas_intersection", intersection.to_string()),
        ]
    }
}

/// Layout of one sample:
/// `<root>/datapoint_<n>/gt.txt` and `<root>/datapoint_<n>/images/datapoint_<n>/tci.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    pub dir: PathBuf,
    pub label_file: PathBuf,
    pub image_dir: PathBuf,
    pub image_file: PathBuf,
}

impl SamplePaths {
    pub fn new<P: AsRef<Path>>(root: P, id: usize) -> Self {
        let name = format!("datapoint_{}", id);
        let dir = root.as_ref().join(&name);
        let image_dir = dir.join("images").join(&name);

        SamplePaths {
            label_file: dir.join("gt.txt"),
            image_file: image_dir.join("tci.png"),
            dir,
            image_dir,
        }
    }

    /// Create the sample directory tree
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.image_dir)
            .with_context(|| format!("Failed to create sample directory: {:?}", self.image_dir))
    }

    /// Write the ground-truth class id (single line, no trailing newline)
    pub fn write_label(&self, label: u8) -> Result<()> {
        fs::write(&self.label_file, label.to_string())
            .with_context(|| format!("Failed to write label file: {:?}", self.label_file))
    }

    /// Save the crop, then reopen it and write it back with the metadata text fields
    pub fn write_image(&self, crop: &RgbImage, metadata: &SampleMetadata) -> Result<()> {
        crop.save_with_format(&self.image_file, ImageFormat::Png)
            .with_context(|| format!("Failed to save image: {:?}", self.image_file))?;
        embed_text_metadata(&self.image_file, &metadata.text_fields())
    }
}

/// Rewrite a PNG with the given tEXt chunks
pub fn embed_text_metadata<P: AsRef<Path>>(path: P, fields: &[(&str, String)]) -> Result<()> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("Failed to reopen image: {:?}", path))?
        .to_rgb8();

    let file = File::create(path).with_context(|| format!("Failed to create image: {:?}", path))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    for (key, value) in fields {
        encoder
            .add_text_chunk(key.to_string(), value.clone())
            .with_context(|| format!("Failed to add text chunk {}", key))?;
    }

    let mut writer = encoder
        .write_header()
        .context("Failed to write PNG header")?;
    writer
        .write_image_data(image.as_raw())
        .context("Failed to write PNG data")?;
    writer.finish().context("Failed to finish PNG")?;

    Ok(())
}

/// Read the tEXt chunks of a PNG as key/value pairs
pub fn read_text_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open image: {:?}", path))?;
    let reader = png::Decoder::new(file)
        .read_info()
        .with_context(|| format!("Failed to decode PNG: {:?}", path))?;

    Ok(reader
        .info()
        .uncompressed_latin1_text
        .iter()
        .map(|chunk| (chunk.keyword.clone(), chunk.text.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    #[test]
    fn test_sample_paths_layout() {
        let paths = SamplePaths::new("out", 7);
        assert_eq!(paths.dir, PathBuf::from("out/datapoint_7"));
        assert_eq!(paths.label_file, PathBuf::from("out/datapoint_7/gt.txt"));
        assert_eq!(
            paths.image_file,
            PathBuf::from("out/datapoint_7/images/datapoint_7/tci.png")
        );
    }

    #[test]
    fn test_text_fields() {
        let metadata = SampleMetadata {
            timestamp: "2024-01".to_string(),
            label: 2,
            satlas_intersection: false,
        };
        assert_eq!(
            metadata.text_fields(),
            vec![
                ("timestamp", "2024-01".to_string()),
                ("noaa_enc_label", "2".to_string()),
                ("satlas_intersection", "False".to_string()),
            ]
        );
    }

    #[test]
    fn test_write_sample_files() {
        let dir = TempDir::new().unwrap();
        let paths = SamplePaths::new(dir.path(), 0);
        paths.create().unwrap();
        paths.write_label(1).unwrap();

        let crop = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let metadata = SampleMetadata {
            timestamp: "2024-01".to_string(),
            label: 1,
            satlas_intersection: true,
        };
        paths.write_image(&crop, &metadata).unwrap();

        assert_eq!(fs::read_to_string(&paths.label_file).unwrap(), "1");

        let text = read_text_metadata(&paths.image_file).unwrap();
        assert!(text.contains(&("noaa_enc_label".to_string(), "1".to_string())));
        assert!(text.contains(&("satlas_intersection".to_string(), "True".to_string())));
        assert!(text.contains(&("timestamp".to_string(), "2024-01".to_string())));

        let reopened = image::open(&paths.image_file).unwrap().to_rgb8();
        assert_eq!(reopened.get_pixel(3, 3).0, [1, 2, 3]);
    }
}

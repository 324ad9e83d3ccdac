pub mod builder;
pub mod sample;

pub use builder::{retention, BuildReport, DatasetBuilder, EncImagesConfig, Retention};
pub use sample::{SampleMetadata, SamplePaths};

pub mod cloud;
pub mod error;
pub mod stats;

pub use cloud::{CloudSink, CsvCloudWriter};
pub use error::ExportError;
pub use stats::{JsonLinesStatsWriter, StatsSink};

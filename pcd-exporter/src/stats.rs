use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use pcd_core::filter::FilterStats;

use crate::error::ExportError;

pub trait StatsSink {
    fn publish_stats(&mut self, stats: &FilterStats) -> Result<(), ExportError>;
}

impl StatsSink for Vec<FilterStats> {
    fn publish_stats(&mut self, stats: &FilterStats) -> Result<(), ExportError> {
        self.push(stats.clone());
        Ok(())
    }
}

/// Appends one JSON object per line, flushed after every record.
pub struct JsonLinesStatsWriter<W: Write> {
    writer: W,
}

impl JsonLinesStatsWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesStatsWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StatsSink for JsonLinesStatsWriter<W> {
    fn publish_stats(&mut self, stats: &FilterStats) -> Result<(), ExportError> {
        serde_json::to_writer(&mut self.writer, stats)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::WriterBuilder;

use pcd_core::pointcloud::point::{Header, PointCloud};

use crate::error::ExportError;

const COLUMNS: [&str; 4] = ["x", "y", "z", "intensity"];

pub trait CloudSink {
    fn publish_cloud(&mut self, cloud: &PointCloud) -> Result<(), ExportError>;
}

impl CloudSink for Vec<PointCloud> {
    fn publish_cloud(&mut self, cloud: &PointCloud) -> Result<(), ExportError> {
        self.push(cloud.clone());
        Ok(())
    }
}

/// Writes each published cloud to `<dir>/<seq>.csv`.
pub struct CsvCloudWriter {
    dir: PathBuf,
}

impl CsvCloudWriter {
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| ExportError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn frame_path(&self, header: &Header) -> PathBuf {
        self.dir.join(format!("{:06}.csv", header.seq))
    }
}

impl CloudSink for CsvCloudWriter {
    fn publish_cloud(&mut self, cloud: &PointCloud) -> Result<(), ExportError> {
        let path = self.frame_path(&cloud.header);
        let mut writer = WriterBuilder::new().has_headers(false).from_path(&path)?;

        // written explicitly so empty clouds still get a header row
        writer.write_record(COLUMNS)?;
        for point in &cloud.points {
            writer.serialize(point)?;
        }
        writer.flush()?;

        log::debug!("wrote {} points to {:?}", cloud.len(), path);
        Ok(())
    }
}

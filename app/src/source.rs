use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::{DateTime, Utc};
use crossbeam::channel::Sender;
use serde::Deserialize;

use pcd_core::{
    filter::ConfigUpdate,
    pointcloud::point::{PointCloud, Stamp},
};

use crate::error::AppError;

pub fn now_stamp() -> Stamp {
    to_stamp(chrono::Utc::now())
}

/// Seconds saturate at the bounds of `u32`.
pub fn to_stamp(time: DateTime<Utc>) -> Stamp {
    Stamp {
        sec: u32::try_from(time.timestamp().max(0)).unwrap_or(u32::MAX),
        nsec: time.timestamp_subsec_nanos(),
    }
}

/// Replays parsed frames as a sensor would: one frame per interval, stamped
/// at the moment it is published.
pub struct CloudPlayer {
    pub frames: Vec<PointCloud>,
    pub interval: Duration,
}

impl CloudPlayer {
    pub fn spawn(self, points_raw: Sender<PointCloud>) -> std::io::Result<JoinHandle<usize>> {
        thread::Builder::new()
            .name("cloud_player".to_string())
            .spawn(move || self.run(points_raw))
    }

    pub fn run(self, points_raw: Sender<PointCloud>) -> usize {
        let mut sent = 0;
        let total = self.frames.len();
        for (i, mut frame) in self.frames.into_iter().enumerate() {
            frame.header.stamp = now_stamp();
            if points_raw.send(frame).is_err() {
                log::warn!("points_raw closed after {} frames", sent);
                break;
            }
            sent += 1;
            if i + 1 < total && !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
        sent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConfigScriptEntry {
    pub sample_num: i64,
    /// Wait before publishing, relative to the previous entry.
    #[serde(default)]
    pub delay_ms: u64,
}

pub fn read_config_script(reader: impl BufRead) -> std::io::Result<Vec<ConfigScriptEntry>> {
    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<ConfigScriptEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("skipping config line {}: {}", line_no + 1, e),
        }
    }
    Ok(entries)
}

pub fn load_config_script(path: &Path) -> Result<Vec<ConfigScriptEntry>, AppError> {
    let io_error = |source| AppError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    read_config_script(BufReader::new(file)).map_err(io_error)
}

pub fn spawn_config_script(
    entries: Vec<ConfigScriptEntry>,
    config_topic: Sender<ConfigUpdate>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("config_script".to_string())
        .spawn(move || {
            for entry in entries {
                if entry.delay_ms > 0 {
                    thread::sleep(Duration::from_millis(entry.delay_ms));
                }
                let update = ConfigUpdate {
                    sample_num: entry.sample_num,
                };
                if config_topic.send(update).is_err() {
                    break;
                }
            }
        })
}

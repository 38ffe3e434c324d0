use std::path::PathBuf;

use pcd_core::ConfigError;
use pcd_exporter::ExportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no input files matched")]
    NoInput,
    #[error("failed to parse point cloud: {0}")]
    Parse(String),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid --sample-num: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to spawn thread: {0}")]
    Spawn(std::io::Error),
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

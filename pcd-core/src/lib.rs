pub mod error;
pub mod filter;
pub mod pointcloud;

pub use error::ConfigError;

use crate::pointcloud::point::PointCloud;

pub mod config;
pub mod random_filter;
pub mod stats;

pub use config::{ConfigUpdate, SamplerConfig, DEFAULT_SAMPLE_NUM};
pub use random_filter::RandomFilter;
pub use stats::FilterStats;

/// What a points filter publishes for one incoming cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredCloud {
    pub cloud: PointCloud,
    pub stats: FilterStats,
}

pub trait PointsFilter {
    fn name(&self) -> &'static str;
    fn filter(&self, point_cloud: &PointCloud) -> FilteredCloud;
}

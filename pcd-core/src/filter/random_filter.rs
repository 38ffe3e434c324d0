use std::sync::Arc;

use crate::error::ConfigError;
use crate::filter::{ConfigUpdate, FilterStats, FilteredCloud, PointsFilter, SamplerConfig};
use crate::pointcloud::decimation::decimator::{PointCloudDecimator, StrideDecimator};
use crate::pointcloud::point::PointCloud;

pub const RANDOM_FILTER_NAME: &str = "random_filter";

/// Reduces each incoming cloud to at most `sample_num` points by fixed-stride
/// decimation. Despite the name, selection is deterministic.
pub struct RandomFilter {
    config: Arc<SamplerConfig>,
}

impl RandomFilter {
    pub fn new(config: Arc<SamplerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<SamplerConfig> {
        &self.config
    }

    pub fn on_config(&self, update: &ConfigUpdate) -> Result<usize, ConfigError> {
        match self.config.apply(update) {
            Ok(sample_num) => {
                log::info!("sample_num set to {}", sample_num);
                Ok(sample_num)
            }
            Err(e) => {
                log::warn!(
                    "ignoring config update ({}), keeping sample_num {}",
                    e,
                    self.config.get()
                );
                Err(e)
            }
        }
    }

    /// Decimates `point_cloud` against an explicit target count.
    pub fn filter_with(&self, point_cloud: &PointCloud, target_count: usize) -> FilteredCloud {
        let original_points_size = point_cloud.len();

        let cloud = if point_cloud.is_empty() {
            PointCloud::empty_like(&point_cloud.header)
        } else {
            let decimator = StrideDecimator::new(target_count);
            PointCloud::new(
                point_cloud.header.clone(),
                decimator.decimate(&point_cloud.points),
            )
        };

        let stats = FilterStats::without_rings(
            &point_cloud.header,
            self.name(),
            original_points_size,
            cloud.len(),
        );

        FilteredCloud { cloud, stats }
    }
}

impl PointsFilter for RandomFilter {
    fn name(&self) -> &'static str {
        RANDOM_FILTER_NAME
    }

    fn filter(&self, point_cloud: &PointCloud) -> FilteredCloud {
        // one snapshot per cloud
        let target_count = self.config.get();
        self.filter_with(point_cloud, target_count)
    }
}

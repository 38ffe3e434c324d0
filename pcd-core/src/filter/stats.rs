use serde::{Deserialize, Serialize};

use crate::pointcloud::point::Header;

/// Before/after sizes reported by a points filter for one cloud.
///
/// The ring fields exist so that every filter reports the same record shape;
/// filters without per-ring structure leave them at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub header: Header,
    pub filter_name: String,
    pub original_points_size: usize,
    pub filtered_points_size: usize,
    pub original_ring_size: usize,
    pub filtered_ring_size: usize,
}

impl FilterStats {
    pub fn without_rings(
        header: &Header,
        filter_name: &str,
        original_points_size: usize,
        filtered_points_size: usize,
    ) -> Self {
        FilterStats {
            header: header.clone(),
            filter_name: filter_name.to_string(),
            original_points_size,
            filtered_points_size,
            original_ring_size: 0,
            filtered_ring_size: 0,
        }
    }

    /// Fraction of the input that was kept, 1.0 for an empty input.
    pub fn retention(&self) -> f64 {
        if self.original_points_size == 0 {
            return 1.0;
        }
        self.filtered_points_size as f64 / self.original_points_size as f64
    }
}

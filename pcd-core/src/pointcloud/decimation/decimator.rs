use crate::pointcloud::point::Point;

pub trait PointCloudDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point>;
}

/// Keeps every `step`-th point, starting at index 0, until `target_count`
/// points have been collected. `step` is `points.len() / target_count`,
/// truncated and clamped to at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideDecimator {
    pub target_count: usize,
}

impl StrideDecimator {
    pub fn new(target_count: usize) -> Self {
        Self { target_count }
    }

    /// The stride actually used for a cloud of `point_count` points.
    pub fn step(&self, point_count: usize) -> usize {
        raw_step(point_count, self.target_count).unwrap_or(0).max(1)
    }

    /// Number of points `decimate` returns for a cloud of `point_count` points.
    pub fn output_len(&self, point_count: usize) -> usize {
        if point_count == 0 || self.target_count == 0 {
            return 0;
        }
        let step = self.step(point_count);
        point_count.div_ceil(step).min(self.target_count)
    }
}

/// Truncating stride without any clamping. `None` when the division has no
/// divisor, `Some(0)` when the requested count exceeds the cloud size.
/// Both of these would make the modulo test in the selection loop undefined.
pub fn raw_step(point_count: usize, target_count: usize) -> Option<usize> {
    point_count.checked_div(target_count)
}

impl PointCloudDecimator for StrideDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point> {
        let target_count = self.target_count;
        if points.is_empty() || target_count == 0 {
            return Vec::new();
        }

        let step = self.step(points.len());
        if raw_step(points.len(), target_count) != Some(step) {
            log::debug!(
                "stride clamped to {} ({} points, target {})",
                step,
                points.len(),
                target_count
            );
        }

        let mut decimated_points = Vec::with_capacity(self.output_len(points.len()));
        for (i, point) in points.iter().enumerate() {
            if decimated_points.len() >= target_count {
                break;
            }
            if i % step == 0 {
                decimated_points.push(*point);
            }
        }

        decimated_points
    }
}

use std::thread::{self, JoinHandle};

use crossbeam::channel::{never, select, Receiver};

use pcd_core::{filter::FilterStats, pointcloud::point::PointCloud};
use pcd_exporter::{CloudSink, ExportError, StatsSink};

enum Topic {
    FilteredPoints,
    PointsFilterInfo,
}

pub struct Publisher<C, S> {
    pub cloud_sink: C,
    pub stats_sink: S,
}

impl<C, S> Publisher<C, S>
where
    C: CloudSink + Send + 'static,
    S: StatsSink + Send + 'static,
{
    pub fn spawn(
        self,
        filtered_points: Receiver<PointCloud>,
        points_filter_info: Receiver<FilterStats>,
    ) -> std::io::Result<JoinHandle<Result<Self, ExportError>>> {
        thread::Builder::new()
            .name("publisher".to_string())
            .spawn(move || self.run(filtered_points, points_filter_info))
    }

    /// Drains both topics until each has been closed by the node.
    pub fn run(
        mut self,
        mut filtered_points: Receiver<PointCloud>,
        mut points_filter_info: Receiver<FilterStats>,
    ) -> Result<Self, ExportError> {
        let mut open_topics = 2;
        while open_topics > 0 {
            let closed = select! {
                recv(filtered_points) -> msg => match msg {
                    Ok(cloud) => {
                        self.cloud_sink.publish_cloud(&cloud)?;
                        None
                    }
                    Err(_) => Some(Topic::FilteredPoints),
                },
                recv(points_filter_info) -> msg => match msg {
                    Ok(stats) => {
                        self.stats_sink.publish_stats(&stats)?;
                        None
                    }
                    Err(_) => Some(Topic::PointsFilterInfo),
                },
            };
            match closed {
                Some(Topic::FilteredPoints) => filtered_points = never(),
                Some(Topic::PointsFilterInfo) => points_filter_info = never(),
                None => continue,
            }
            open_topics -= 1;
        }
        Ok(self)
    }
}

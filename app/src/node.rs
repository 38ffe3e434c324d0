use crossbeam::channel::{never, select, Receiver, Sender};

use pcd_core::{
    filter::{ConfigUpdate, FilterStats, FilteredCloud, PointsFilter, RandomFilter},
    pointcloud::point::PointCloud,
};

pub enum Event {
    Config(ConfigUpdate),
    Cloud(PointCloud),
}

enum Topic {
    Config,
    PointsRaw,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeSummary {
    pub frames: usize,
    pub original_points: usize,
    pub filtered_points: usize,
    pub accepted_updates: usize,
    pub rejected_updates: usize,
}

/// Serializes config updates and clouds through one thread, so an update
/// always lands strictly between two clouds.
pub struct RandomFilterNode {
    filter: RandomFilter,
    summary: NodeSummary,
}

impl RandomFilterNode {
    pub fn new(filter: RandomFilter) -> Self {
        Self {
            filter,
            summary: NodeSummary::default(),
        }
    }

    pub fn summary(&self) -> NodeSummary {
        self.summary
    }

    pub fn handle(&mut self, event: Event) -> Option<FilteredCloud> {
        match event {
            Event::Config(update) => {
                match self.filter.on_config(&update) {
                    Ok(_) => self.summary.accepted_updates += 1,
                    Err(_) => self.summary.rejected_updates += 1,
                }
                None
            }
            Event::Cloud(cloud) => {
                let filtered = self.filter.filter(&cloud);
                log::debug!(
                    "frame {}: {} -> {} points ({:.1}%)",
                    cloud.header.seq,
                    filtered.stats.original_points_size,
                    filtered.stats.filtered_points_size,
                    filtered.stats.retention() * 100.0
                );
                self.summary.frames += 1;
                self.summary.original_points += filtered.stats.original_points_size;
                self.summary.filtered_points += filtered.stats.filtered_points_size;
                Some(filtered)
            }
        }
    }

    /// Runs until `points_raw` closes or the output topics are dropped.
    pub fn spin(
        mut self,
        mut config_topic: Receiver<ConfigUpdate>,
        points_raw: Receiver<PointCloud>,
        filtered_points: Sender<PointCloud>,
        points_filter_info: Sender<FilterStats>,
    ) -> NodeSummary {
        loop {
            let event = select! {
                recv(config_topic) -> msg => msg.map(Event::Config).map_err(|_| Topic::Config),
                recv(points_raw) -> msg => msg.map(Event::Cloud).map_err(|_| Topic::PointsRaw),
            };
            let event = match event {
                Ok(event) => event,
                Err(Topic::Config) => {
                    log::debug!("config topic closed");
                    config_topic = never();
                    continue;
                }
                Err(Topic::PointsRaw) => break,
            };

            if let Some(FilteredCloud { cloud, stats }) = self.handle(event) {
                if filtered_points.send(cloud).is_err() || points_filter_info.send(stats).is_err()
                {
                    log::error!("output topics closed, stopping");
                    break;
                }
            }
        }

        self.summary()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crossbeam::channel::{bounded, unbounded};
    use pcd_core::{
        filter::SamplerConfig,
        pointcloud::point::{Header, Point},
    };

    fn make_cloud(seq: u32, n: usize) -> PointCloud {
        PointCloud::new(
            Header {
                seq,
                frame_id: "velodyne".to_string(),
                ..Default::default()
            },
            (0..n).map(|i| Point::new(i as f32, 0.0, 0.0, 0.0)).collect(),
        )
    }

    fn make_node() -> RandomFilterNode {
        RandomFilterNode::new(RandomFilter::new(Arc::new(SamplerConfig::default())))
    }

    #[test]
    fn updates_apply_to_following_clouds() {
        let mut node = make_node();

        let first = node.handle(Event::Cloud(make_cloud(0, 10_000))).unwrap();
        assert_eq!(first.cloud.len(), 1000);

        assert!(node.handle(Event::Config(ConfigUpdate { sample_num: 100 })).is_none());
        let second = node.handle(Event::Cloud(make_cloud(1, 10_000))).unwrap();
        assert_eq!(second.cloud.len(), 100);
        assert_eq!(second.stats.header.seq, 1);

        node.handle(Event::Config(ConfigUpdate { sample_num: 0 }));
        let third = node.handle(Event::Cloud(make_cloud(2, 100))).unwrap();
        assert_eq!(third.cloud.len(), 100);

        let summary = node.summary();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.original_points, 20_100);
        assert_eq!(summary.filtered_points, 1200);
        assert_eq!(summary.accepted_updates, 1);
        assert_eq!(summary.rejected_updates, 1);
    }

    #[test]
    fn spin_publishes_every_frame_and_exits_when_input_closes() {
        let (config_tx, config_rx) = bounded(10);
        let (cloud_tx, cloud_rx) = bounded(10);
        let (filtered_tx, filtered_rx) = unbounded();
        let (info_tx, info_rx) = unbounded();

        let producer = thread::spawn(move || {
            for (seq, n) in [(0, 0), (1, 500), (2, 10_000)] {
                cloud_tx.send(make_cloud(seq, n)).unwrap();
            }
        });
        drop(config_tx);

        let summary = make_node().spin(config_rx, cloud_rx, filtered_tx, info_tx);
        producer.join().unwrap();

        assert_eq!(summary.frames, 3);
        let sizes: Vec<usize> = filtered_rx.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![0, 500, 1000]);

        let stats: Vec<FilterStats> = info_rx.iter().collect();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].original_points_size, 0);
        assert_eq!(stats[0].filtered_points_size, 0);
        assert_eq!(stats[2].original_points_size, 10_000);
        assert!(stats.iter().all(|s| s.filter_name == "random_filter"));
    }

    #[test]
    fn spin_stops_when_outputs_are_dropped() {
        let (_config_tx, config_rx) = bounded::<ConfigUpdate>(10);
        let (cloud_tx, cloud_rx) = unbounded();
        let (filtered_tx, filtered_rx) = unbounded();
        let (info_tx, info_rx) = unbounded();
        drop(filtered_rx);
        drop(info_rx);

        cloud_tx.send(make_cloud(0, 10)).unwrap();
        cloud_tx.send(make_cloud(1, 10)).unwrap();

        let summary = make_node().spin(config_rx, cloud_rx, filtered_tx, info_tx);
        assert_eq!(summary.frames, 1);
    }
}

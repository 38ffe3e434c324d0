use serde::{Deserialize, Serialize};

// Layout of a single return from a rotating sensor: position plus reflectance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32, intensity: f32) -> Self {
        Self { x, y, z, intensity }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub sec: u32,
    pub nsec: u32,
}

/// Metadata carried with every cloud. Filters never interpret it; they copy it
/// onto whatever they derive from the cloud so consumers can correlate frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub seq: u32,
    pub stamp: Stamp,
    pub frame_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub header: Header,
    pub points: Vec<Point>,
}

impl PointCloud {
    pub fn new(header: Header, points: Vec<Point>) -> Self {
        PointCloud { header, points }
    }

    /// An empty cloud sharing `header`.
    pub fn empty_like(header: &Header) -> Self {
        PointCloud {
            header: header.clone(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

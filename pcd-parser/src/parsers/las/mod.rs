use std::path::{Path, PathBuf};

use las::Reader;

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::{parse_frames, ParseError, Parser, ParserProvider};

pub struct LasParserProvider {
    pub filenames: Vec<PathBuf>,
    pub frame_id: String,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filenames: self.filenames.clone(),
            frame_id: self.frame_id.clone(),
        })
    }
}

pub struct LasParser {
    pub filenames: Vec<PathBuf>,
    pub frame_id: String,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<Vec<PointCloud>, ParseError> {
        let start = std::time::Instant::now();
        let frames = parse_frames(&self.filenames, &self.frame_id, read_points)?;
        log::info!("Read {} LAS frames in {:?}", frames.len(), start.elapsed());
        Ok(frames)
    }
}

fn read_points(path: &Path) -> Result<Vec<Point>, ParseError> {
    let mut reader = Reader::from_path(path)?;

    let mut points = Vec::new();
    for las_point in reader.points() {
        let las_point = las_point?;
        points.push(Point {
            x: las_point.x as f32,
            y: las_point.y as f32,
            z: las_point.z as f32,
            intensity: las_point.intensity as f32,
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_las(path: &Path, points: &[(f64, f64, f64, u16)]) {
        let mut builder = las::Builder::from((1, 2));
        builder.point_format = las::point::Format::new(0).unwrap();
        let header = builder.into_header().unwrap();
        let mut writer = las::Writer::from_path(path, header).unwrap();
        for &(x, y, z, intensity) in points {
            writer
                .write_point(las::Point {
                    x,
                    y,
                    z,
                    intensity,
                    ..Default::default()
                })
                .unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn reads_points_and_frame_headers() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("000.las");
        let second = dir.path().join("001.las");
        write_las(&first, &[(1.5, -2.25, 3.0, 100), (4.0, 5.0, -6.125, 65535)]);
        write_las(&second, &[(0.0, 0.0, 0.0, 0)]);

        let provider = LasParserProvider {
            filenames: vec![first, second],
            frame_id: "velodyne".to_string(),
        };
        let frames = provider.get_parser().parse().unwrap();
        assert_eq!(frames.len(), 2);

        assert_eq!(frames[0].header.seq, 0);
        assert_eq!(frames[1].header.seq, 1);
        assert!(frames.iter().all(|f| f.header.frame_id == "velodyne"));

        assert_eq!(frames[0].len(), 2);
        assert_eq!(frames[0].points[0], Point::new(1.5, -2.25, 3.0, 100.0));
        assert_eq!(frames[0].points[1], Point::new(4.0, 5.0, -6.125, 65535.0));
        assert_eq!(frames[1].points, vec![Point::default()]);
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let provider = LasParserProvider {
            filenames: vec![PathBuf::from("does/not/exist.las")],
            frame_id: "velodyne".to_string(),
        };
        let err = provider.get_parser().parse().unwrap_err();
        assert!(err.to_string().contains("exist.las"));
    }
}

use std::{collections::HashMap, path::Path, path::PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::{parse_frames, ParseError, Parser, ParserProvider};

const ATTRIBUTE_NAMES: [&str; 4] = ["x", "y", "z", "intensity"];

pub struct CsvParserProvider {
    pub filenames: Vec<PathBuf>,
    pub frame_id: String,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filenames: self.filenames.clone(),
            frame_id: self.frame_id.clone(),
        })
    }
}

pub struct CsvParser {
    pub filenames: Vec<PathBuf>,
    pub frame_id: String,
}

impl Parser for CsvParser {
    fn parse(&self) -> Result<Vec<PointCloud>, ParseError> {
        let start = std::time::Instant::now();
        let frames = parse_frames(&self.filenames, &self.frame_id, read_points)?;
        log::info!("Read {} CSV frames in {:?}", frames.len(), start.elapsed());
        Ok(frames)
    }
}

fn read_points(path: &Path) -> Result<Vec<Point>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let mut records = reader.records();
    let first = match records.next() {
        Some(record) => record?,
        None => return Ok(Vec::new()),
    };

    let mut points = Vec::new();
    let field_mapping = if is_header(&first) {
        create_field_mapping(Some(&first))?
    } else {
        let mapping = create_field_mapping(None)?;
        points.push(parse_point(&first, &mapping)?);
        mapping
    };

    for record in records {
        points.push(parse_point(&record?, &field_mapping)?);
    }

    Ok(points)
}

fn is_header(record: &StringRecord) -> bool {
    record
        .iter()
        .any(|field| !field.is_empty() && field.parse::<f64>().is_err())
}

fn normalize(name: &str) -> String {
    name.to_lowercase().replace(['_', '-'], "")
}

fn create_field_mapping(
    headers: Option<&StringRecord>,
) -> Result<HashMap<String, usize>, ParseError> {
    let mut mapping = HashMap::new();

    match headers {
        Some(headers) => {
            for (index, header) in headers.iter().enumerate() {
                let normalized_header = normalize(header);
                if let Some(attr_name) = ATTRIBUTE_NAMES
                    .iter()
                    .find(|attr_name| normalize(attr_name) == normalized_header)
                {
                    mapping.insert(attr_name.to_string(), index);
                }
            }
        }
        None => {
            for (index, attr_name) in ATTRIBUTE_NAMES.iter().enumerate() {
                mapping.insert(attr_name.to_string(), index);
            }
        }
    }

    for attr_name in &["x", "y", "z"] {
        if !mapping.contains_key(*attr_name) {
            return Err(format!(
                "Required attribute '{}' is missing in CSV headers or mapping.",
                attr_name
            )
            .into());
        }
    }

    Ok(mapping)
}

fn get_field_value<'a>(
    record: &'a StringRecord,
    field_mapping: &HashMap<String, usize>,
    field_name: &str,
) -> Option<&'a str> {
    field_mapping
        .get(field_name)
        .and_then(|&index| record.get(index))
        .filter(|value| !value.is_empty())
}

fn parse_field(
    record: &StringRecord,
    field_mapping: &HashMap<String, usize>,
    field_name: &str,
) -> Result<f32, ParseError> {
    let value = get_field_value(record, field_mapping, field_name)
        .ok_or_else(|| format!("Missing '{}' field", field_name))?;
    value
        .parse::<f32>()
        .map_err(|e| format!("Failed to parse '{}': {}", field_name, e).into())
}

fn parse_point(
    record: &StringRecord,
    field_mapping: &HashMap<String, usize>,
) -> Result<Point, ParseError> {
    let x = parse_field(record, field_mapping, "x")?;
    let y = parse_field(record, field_mapping, "y")?;
    let z = parse_field(record, field_mapping, "z")?;
    let intensity = match get_field_value(record, field_mapping, "intensity") {
        Some(_) => parse_field(record, field_mapping, "intensity")?,
        None => 0.0,
    };

    Ok(Point { x, y, z, intensity })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_columns_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "frame.csv",
            "Intensity,Z,Y,X\n5,3.0,2.0,1.0\n6,30.0,20.0,10.0\n",
        );

        let points = read_points(&path).unwrap();
        assert_eq!(
            points,
            vec![Point::new(1.0, 2.0, 3.0, 5.0), Point::new(10.0, 20.0, 30.0, 6.0)]
        );
    }

    #[test]
    fn headerless_file_uses_positional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "frame.txt", "1, 2, 3, 4\n5, 6, 7\n");

        let points = read_points(&path).unwrap();
        assert_eq!(
            points,
            vec![Point::new(1.0, 2.0, 3.0, 4.0), Point::new(5.0, 6.0, 7.0, 0.0)]
        );
    }

    #[test]
    fn missing_coordinate_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "frame.csv", "x,y,intensity\n1,2,3\n");
        assert!(read_points(&path).is_err());
    }

    #[test]
    fn bad_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "frame.csv", "x,y,z\n1,2,3\n1,oops,3\n");
        let err = read_points(&path).unwrap_err();
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn empty_file_is_an_empty_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "frame.csv", "");
        assert!(read_points(&path).unwrap().is_empty());
    }

    #[test]
    fn provider_parses_each_file_as_a_frame() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(dir.path(), "0.csv", "x,y,z\n0,0,0\n1,1,1\n");
        let second = write_file(dir.path(), "1.csv", "x,y,z\n2,2,2\n");

        let provider = CsvParserProvider {
            filenames: vec![first, second],
            frame_id: "velodyne".to_string(),
        };
        let frames = provider.get_parser().parse().unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 2);
        assert_eq!(frames[1].len(), 1);
        assert_eq!(frames[1].header.seq, 1);
        assert_eq!(frames[1].header.frame_id, "velodyne");
    }
}

use std::path::PathBuf;

use pcd_parser::parsers::{csv::CsvParserProvider, ParserProvider as _};

fn main() {
    let provider = CsvParserProvider {
        filenames: vec![PathBuf::from("examples/data/sample.txt")],
        frame_id: "velodyne".to_string(),
    };
    let parser = provider.get_parser();

    let frames = match parser.parse() {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("Failed to parse: {}", e);
            return;
        }
    };

    for frame in &frames {
        println!(
            "Frame {seq}: {num_points} points",
            seq = frame.header.seq,
            num_points = frame.len()
        );
        if let Some(first) = frame.points.first() {
            println!("  First point: {:?}", first);
        }
    }
}

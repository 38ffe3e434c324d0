mod error;
mod node;
mod publisher;
mod source;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use crossbeam::channel::bounded;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;

use pcd_core::filter::{ConfigUpdate, RandomFilter, SamplerConfig};
use pcd_exporter::{CsvCloudWriter, JsonLinesStatsWriter};
use pcd_parser::parsers::csv::CsvParserProvider;
use pcd_parser::parsers::{check_and_get_extension, Extension};
use pcd_parser::parsers::{las::LasParserProvider, Parser as _, ParserProvider};

use crate::error::AppError;
use crate::node::RandomFilterNode;
use crate::publisher::Publisher;
use crate::source::{load_config_script, spawn_config_script, CloudPlayer};

const POINTS_RAW_QUEUE: usize = 10;
const CONFIG_QUEUE: usize = 10;
const FILTERED_POINTS_QUEUE: usize = 10;
const POINTS_FILTER_INFO_QUEUE: usize = 1000;

#[derive(Parser, Debug)]
#[command(
    name = "random_filter",
    about = "Downsamples a stream of point clouds to a bounded number of points",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// Input frames, one point cloud per file (csv, txt, las, laz)
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    #[arg(short, long, required = true, value_name = "DIR")]
    output: String,

    /// Initial target point count per cloud
    #[arg(long, default_value_t = 1000, allow_negative_numbers = true)]
    sample_num: i64,

    /// JSON lines of {"sample_num": N, "delay_ms": D} published while frames play
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Period between published frames
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    #[arg(long, default_value = "velodyne")]
    frame_id: String,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn expand_globs(input_patterns: Vec<String>) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern)? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => log::warn!("skipping unreadable path: {:?}", e),
                }
            }
            matched.sort();
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    if paths.is_empty() {
        return Err(AppError::NoInput);
    }
    Ok(paths)
}

fn get_parser_provider(
    input_files: Vec<PathBuf>,
    frame_id: String,
) -> Result<Box<dyn ParserProvider>, AppError> {
    let extension =
        check_and_get_extension(&input_files).map_err(|e| AppError::Parse(e.to_string()))?;
    let provider: Box<dyn ParserProvider> = match extension {
        Extension::Las | Extension::Laz => Box::new(LasParserProvider {
            filenames: input_files,
            frame_id,
        }),
        Extension::Csv | Extension::Txt => Box::new(CsvParserProvider {
            filenames: input_files,
            frame_id,
        }),
    };
    Ok(provider)
}

fn run(args: Cli) -> Result<(), AppError> {
    log::info!("input files: {:?}", args.input);
    log::info!("output folder: {}", args.output);
    log::info!("sample_num: {}", args.sample_num);
    log::info!("frame interval: {} ms", args.interval_ms);

    let start = std::time::Instant::now();

    let filter = RandomFilter::new(Arc::new(SamplerConfig::default()));
    filter.on_config(&ConfigUpdate {
        sample_num: args.sample_num,
    })?;

    let input_files = expand_globs(args.input)?;
    log::info!("Expanded input files: {:?}", input_files);

    log::info!("start parsing...");
    let start_local = std::time::Instant::now();
    let provider = get_parser_provider(input_files, args.frame_id)?;
    let frames = provider
        .get_parser()
        .parse()
        .map_err(|e| AppError::Parse(e.to_string()))?;
    log::info!(
        "finish parsing {} frames in {:?}",
        frames.len(),
        start_local.elapsed()
    );

    let config_script = match &args.config {
        Some(path) => load_config_script(path)?,
        None => Vec::new(),
    };

    let output_path = PathBuf::from(args.output);
    let cloud_sink = CsvCloudWriter::create(output_path.join("filtered_points"))?;
    let stats_sink = JsonLinesStatsWriter::create(output_path.join("points_filter_info.jsonl"))?;

    let (config_tx, config_rx) = bounded(CONFIG_QUEUE);
    let (points_raw_tx, points_raw_rx) = bounded(POINTS_RAW_QUEUE);
    let (filtered_tx, filtered_rx) = bounded(FILTERED_POINTS_QUEUE);
    let (info_tx, info_rx) = bounded(POINTS_FILTER_INFO_QUEUE);

    let publisher = Publisher {
        cloud_sink,
        stats_sink,
    }
    .spawn(filtered_rx, info_rx)
    .map_err(AppError::Spawn)?;

    // not joined; remaining delays end with the process
    spawn_config_script(config_script, config_tx).map_err(AppError::Spawn)?;

    let player = CloudPlayer {
        frames,
        interval: Duration::from_millis(args.interval_ms),
    }
    .spawn(points_raw_tx)
    .map_err(AppError::Spawn)?;

    log::info!("start filtering...");
    let node = RandomFilterNode::new(filter);
    let summary = node.spin(config_rx, points_raw_rx, filtered_tx, info_tx);

    let sent = player
        .join()
        .map_err(|_| AppError::ThreadPanicked("cloud_player"))?;
    publisher
        .join()
        .map_err(|_| AppError::ThreadPanicked("publisher"))??;

    log::info!("frames: {} published, {} filtered", sent, summary.frames);
    log::info!(
        "points: {} in, {} out",
        summary.original_points,
        summary.filtered_points
    );
    log::info!(
        "config updates: {} accepted, {} rejected",
        summary.accepted_updates,
        summary.rejected_updates
    );
    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");

    Ok(())
}

fn main() {
    let args = Cli::parse();

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, args.log_level)
        .init();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

use std::{
    error::Error,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use rayon::iter::{
    IndexedParallelIterator as _, IntoParallelRefIterator as _, ParallelIterator as _,
};

use pcd_core::pointcloud::point::{Header, Point, PointCloud};

pub mod csv;
pub mod las;

pub type ParseError = Box<dyn Error + Send + Sync>;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

/// Reads sensor frames, one point cloud per input file, in input order.
pub trait Parser {
    fn parse(&self) -> Result<Vec<PointCloud>, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Csv,
    Txt,
}

pub fn get_extension(extension: &str) -> Option<Extension> {
    match extension.to_ascii_lowercase().as_str() {
        "las" => Some(Extension::Las),
        "laz" => Some(Extension::Laz),
        "csv" => Some(Extension::Csv),
        "txt" => Some(Extension::Txt),
        _ => None,
    }
}

/// The single extension shared by all `paths`.
pub fn check_and_get_extension(paths: &[PathBuf]) -> Result<Extension, ParseError> {
    let mut extensions = vec![];
    for path in paths.iter() {
        let extension = path.extension().and_then(OsStr::to_str);
        match extension {
            Some(ext) => extensions.push(ext.to_ascii_lowercase()),
            None => return Err(format!("File extension is not found: {:?}", path).into()),
        }
    }
    extensions.sort();
    extensions.dedup();

    match extensions.as_slice() {
        [] => Err("No input files".into()),
        [ext] => get_extension(ext)
            .ok_or_else(|| format!("Unsupported extension: {}", ext).into()),
        _ => Err("Multiple extensions are not supported".into()),
    }
}

/// Parses every file with `parse_points` in parallel. The n-th file becomes
/// the frame with `seq == n`.
pub(crate) fn parse_frames<F>(
    filenames: &[PathBuf],
    frame_id: &str,
    parse_points: F,
) -> Result<Vec<PointCloud>, ParseError>
where
    F: Fn(&Path) -> Result<Vec<Point>, ParseError> + Sync,
{
    filenames
        .par_iter()
        .enumerate()
        .map(|(seq, path)| {
            let points = parse_points(path)
                .map_err(|e| -> ParseError { format!("{}: {}", path.display(), e).into() })?;
            log::debug!("parsed {} points from {:?}", points.len(), path);

            let header = Header {
                seq: seq as u32,
                frame_id: frame_id.to_string(),
                ..Default::default()
            };
            Ok(PointCloud::new(header, points))
        })
        .collect()
}

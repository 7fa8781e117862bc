// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loaders turning raw data sources into records consumed by the core:
//! tab-separated junction tables into a [NodeRegistry](crate::NodeRegistry),
//! GeoJSON road centerlines into [Polylines](crate::Polyline) and GeoJSON
//! points into a [FacilitySet](crate::FacilitySet).

use std::io;
use std::path::{Path, PathBuf};

use crate::{build_graph, BuildError, BuildOptions, Graph, NodeRegistry};

mod facilities;
mod nodes;
mod roads;

pub use facilities::{
    read_facilities_from_buffer, read_facilities_from_io, read_facilities_from_path,
};
pub use nodes::{read_nodes_from_buffer, read_nodes_from_io, read_nodes_from_path};
pub use roads::{read_roads_from_buffer, read_roads_from_io, read_roads_from_path, roads_from_geojson};

/// Compression of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the file extension,
    /// or the content if the extension is inconclusive
    Unknown,

    /// Force uncompressed data
    Plain,

    /// Force [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    Gz,

    /// Force [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    Bz2,
}

impl FileFormat {
    /// Guesses the format from the extension of a file.
    /// Returns [FileFormat::Unknown] for anything but `.gz` and `.bz2`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::Gz,
            Some("bz2") => Self::Bz2,
            _ => Self::Unknown,
        }
    }

    /// Guesses the format from the first bytes of a stream.
    fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            Self::Gz
        } else if head.starts_with(b"BZh") {
            Self::Bz2
        } else {
            Self::Plain
        }
    }
}

/// Error which can occur when loading input data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("geojson: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<&'static str>),

    #[error("no node tables (*.nds) in directory")]
    NoNodeTables,

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    fn in_file(path: &Path) -> impl FnOnce(Error) -> Error + '_ {
        move |e| Error::InFile {
            path: path.to_path_buf(),
            source: Box::new(e),
        }
    }
}

/// Wraps the provided stream in a buffered reader, and a decompressor if needed.
fn decompress<'a, R: io::Read + 'a>(
    reader: R,
    format: FileFormat,
) -> io::Result<Box<dyn io::BufRead + 'a>> {
    let mut b = io::BufReader::new(reader);
    let format = match format {
        FileFormat::Unknown => FileFormat::sniff(io::BufRead::fill_buf(&mut b)?),
        f => f,
    };

    Ok(match format {
        FileFormat::Unknown | FileFormat::Plain => Box::new(b),
        FileFormat::Gz => Box::new(io::BufReader::new(flate2::read::MultiGzDecoder::new(b))),
        FileFormat::Bz2 => Box::new(io::BufReader::new(bzip2::read::MultiBzDecoder::new(b))),
    })
}

/// Resolves [FileFormat::Unknown] using the file's extension (if possible).
fn format_for(path: &Path, format: FileFormat) -> FileFormat {
    match format {
        FileFormat::Unknown => FileFormat::from_path(path),
        f => f,
    }
}

/// Loads junction nodes from a file or a directory of `*.nds` tables, road centerlines
/// from a GeoJSON file, and assembles them into a [Graph].
///
/// Compression of every file is detected automatically.
pub fn load_graph(nodes: &Path, roads: &Path, options: &BuildOptions) -> Result<Graph, BuildError> {
    let mut registry = NodeRegistry::default();
    read_nodes_from_path(&mut registry, nodes, FileFormat::Unknown)?;
    let segments = read_roads_from_path(roads, FileFormat::Unknown)?;

    log::info!(
        "loaded {} nodes from {} and {} road segments from {}",
        registry.len(),
        nodes.display(),
        segments.len(),
        roads.display(),
    );

    build_graph(&registry, &segments, options)
}

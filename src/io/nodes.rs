// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{decompress, format_for, Error, FileFormat};
use crate::{Node, NodeRegistry};

const REQUIRED_COLUMNS: [&str; 3] = ["node_id", "x", "y"];

/// Extension of junction tables picked up when reading a whole directory.
const NODE_TABLE_EXTENSION: &str = ".nds";

#[derive(Debug, Deserialize)]
struct NodeRecord {
    node_id: i64,
    x: f64,
    y: f64,
}

/// Reads junction nodes from a tab-separated table into a [NodeRegistry].
///
/// The table must have a header row with at least the `node_id`, `x` and `y` columns;
/// other columns are ignored. Rows which can't be parsed are skipped with a warning.
/// Returns the number of accepted rows.
pub fn read_nodes_from_io<R: io::Read>(
    registry: &mut NodeRegistry,
    reader: R,
    format: FileFormat,
) -> Result<usize, Error> {
    let r = decompress(reader, format)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(r);

    let headers = rdr.headers()?;
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .cloned()
        .filter(|&column| !headers.iter().any(|h| h == column))
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut accepted = 0;
    for row in rdr.deserialize::<NodeRecord>() {
        match row {
            Ok(r) => {
                if registry.insert(Node::new(r.node_id, r.x, r.y)) {
                    accepted += 1;
                }
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => log::warn!("invalid node row: {e}, skipping"),
        }
    }

    Ok(accepted)
}

/// Reads junction nodes from a file, or from all `*.nds` files of a directory
/// (in name order), into a [NodeRegistry].
///
/// When reading a directory, `format` is ignored and guessed for every file separately.
pub fn read_nodes_from_path<P: AsRef<Path>>(
    registry: &mut NodeRegistry,
    path: P,
    format: FileFormat,
) -> Result<usize, Error> {
    let path = path.as_ref();
    if path.is_dir() {
        let tables = list_node_tables(path).map_err(Error::in_file(path))?;
        let mut accepted = 0;
        for table in &tables {
            accepted += read_node_table(registry, table, FileFormat::Unknown)?;
        }
        Ok(accepted)
    } else {
        read_node_table(registry, path, format)
    }
}

/// Reads junction nodes from an in-memory table (compression is detected automatically).
pub fn read_nodes_from_buffer(registry: &mut NodeRegistry, data: &[u8]) -> Result<usize, Error> {
    read_nodes_from_io(registry, data, FileFormat::Unknown)
}

fn read_node_table(
    registry: &mut NodeRegistry,
    path: &Path,
    format: FileFormat,
) -> Result<usize, Error> {
    let accepted = File::open(path)
        .map_err(Error::from)
        .and_then(|f| read_nodes_from_io(registry, f, format_for(path, format)))
        .map_err(Error::in_file(path))?;
    log::debug!("read {} nodes from {}", accepted, path.display());
    Ok(accepted)
}

fn list_node_tables(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut tables = Vec::default();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_table = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| {
                let n = n.trim_end_matches(".gz").trim_end_matches(".bz2");
                n.ends_with(NODE_TABLE_EXTENSION)
            })
            .unwrap_or(false);

        if is_table && path.is_file() {
            tables.push(path);
        }
    }

    if tables.is_empty() {
        return Err(Error::NoNodeTables);
    }

    tables.sort();
    Ok(tables)
}

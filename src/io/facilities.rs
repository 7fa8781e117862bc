// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use geojson::GeoJson;

use super::{decompress, format_for, Error, FileFormat};
use crate::FacilitySet;

/// Reads facilities from a GeoJSON stream, see [FacilitySet::from_geojson].
pub fn read_facilities_from_io<R: io::Read>(
    reader: R,
    format: FileFormat,
) -> Result<FacilitySet, Error> {
    let mut r = decompress(reader, format)?;
    let mut content = String::default();
    r.read_to_string(&mut content)?;
    let document: GeoJson = content.parse()?;
    Ok(FacilitySet::from_geojson(document))
}

/// Reads facilities from a GeoJSON file, see [FacilitySet::from_geojson].
pub fn read_facilities_from_path<P: AsRef<Path>>(
    path: P,
    format: FileFormat,
) -> Result<FacilitySet, Error> {
    let path = path.as_ref();
    File::open(path)
        .map_err(Error::from)
        .and_then(|f| read_facilities_from_io(f, format_for(path, format)))
        .map_err(Error::in_file(path))
}

/// Reads facilities from an in-memory GeoJSON document (compression is detected automatically).
pub fn read_facilities_from_buffer(data: &[u8]) -> Result<FacilitySet, Error> {
    read_facilities_from_io(data, FileFormat::Unknown)
}

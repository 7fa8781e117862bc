// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use geojson::{GeoJson, Geometry, Position, Value};

use super::{decompress, format_for, Error, FileFormat};
use crate::{Point, Polyline};

/// Extracts road segments from a GeoJSON document.
///
/// Every `LineString` becomes one [Polyline], and every part of a `MultiLineString`
/// becomes a separate [Polyline]. Other geometries are skipped. Only the first two
/// ordinates of positions are used; positions with less than two ordinates
/// produce non-finite points, so that the segment is later rejected as malformed.
pub fn roads_from_geojson(document: &GeoJson) -> Vec<Polyline> {
    let mut roads = Vec::default();
    match document {
        GeoJson::FeatureCollection(fc) => {
            for (i, f) in fc.features.iter().enumerate() {
                match &f.geometry {
                    Some(g) => add_geometry(&mut roads, g),
                    None => log::debug!("road feature {i}: no geometry, skipping"),
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(g) = &f.geometry {
                add_geometry(&mut roads, g);
            }
        }
        GeoJson::Geometry(g) => add_geometry(&mut roads, g),
    }
    roads
}

fn add_geometry(roads: &mut Vec<Polyline>, geometry: &Geometry) {
    match &geometry.value {
        Value::LineString(line) => roads.push(to_polyline(line)),
        Value::MultiLineString(lines) => roads.extend(lines.iter().map(|l| to_polyline(l))),
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                add_geometry(roads, g);
            }
        }
        _ => log::debug!("skipping a geometry which is neither a line nor a collection"),
    }
}

fn to_polyline(line: &[Position]) -> Polyline {
    line.iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Point::new(*x, *y),
            _ => Point::new(f64::NAN, f64::NAN),
        })
        .collect()
}

/// Reads road segments from a GeoJSON stream, see [roads_from_geojson].
pub fn read_roads_from_io<R: io::Read>(
    reader: R,
    format: FileFormat,
) -> Result<Vec<Polyline>, Error> {
    let mut r = decompress(reader, format)?;
    let mut content = String::default();
    r.read_to_string(&mut content)?;
    let document: GeoJson = content.parse()?;
    Ok(roads_from_geojson(&document))
}

/// Reads road segments from a GeoJSON file, see [roads_from_geojson].
pub fn read_roads_from_path<P: AsRef<Path>>(
    path: P,
    format: FileFormat,
) -> Result<Vec<Polyline>, Error> {
    let path = path.as_ref();
    File::open(path)
        .map_err(Error::from)
        .and_then(|f| read_roads_from_io(f, format_for(path, format)))
        .map_err(Error::in_file(path))
}

/// Reads road segments from an in-memory GeoJSON document (compression is detected automatically).
pub fn read_roads_from_buffer(data: &[u8]) -> Result<Vec<Polyline>, Error> {
    read_roads_from_io(data, FileFormat::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read() {
        const DATA: &[u8] = include_bytes!("test_fixtures/roads.geojson");
        let roads = read_roads_from_buffer(DATA).unwrap();

        // 3 line strings, 2 parts of a multi line string
        assert_eq!(roads.len(), 6);
        assert_eq!(
            roads[0].endpoints(),
            Some((Point::new(0.5, 0.2), Point::new(99.6, -0.3)))
        );
        assert_eq!(roads[0].points().len(), 3);
        assert_eq!(
            roads[2].endpoints(),
            Some((Point::new(99.8, 100.1), Point::new(0.3, 99.7)))
        );

        // Elevation is dropped
        assert_eq!(
            roads[3].points(),
            &[Point::new(0.0, 99.8), Point::new(0.0, 0.4)]
        );

        // Single-point line string is kept; the graph builder rejects it
        assert_eq!(roads[5].points(), &[Point::new(10.0, 10.0)]);
    }

    #[test]
    fn geometry_collection() {
        let doc: GeoJson = r#"{
            "type": "GeometryCollection",
            "geometries": [
                {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
                {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]},
                {"type": "LineString", "coordinates": [[2, 2], [3, 3]]}
            ]
        }"#
        .parse()
        .unwrap();

        let roads = roads_from_geojson(&doc);
        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0].length(), 2f64.sqrt());
        assert_eq!(roads[1].endpoints(), Some((Point::new(2.0, 2.0), Point::new(3.0, 3.0))));
    }

    #[test]
    fn short_positions() {
        let line = to_polyline(&[vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(line.points()[0], Point::new(1.0, 2.0));
        assert!(!line.points()[1].is_finite());
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            read_roads_from_buffer(b"{\"type\": \"FeatureCollection\""),
            Err(Error::GeoJson(_))
        ));
    }
}

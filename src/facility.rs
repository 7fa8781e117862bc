// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use geojson::feature::Id;
use geojson::{Feature, GeoJson, Value};
use serde_json::{Map, Value as JsonValue};

use crate::Point;

/// A point of interest (hospital, fire station, ...) anchored to the
/// graph node with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: i64,
    pub name: Option<String>,
    pub location: Option<Point>,
    pub properties: Map<String, JsonValue>,
}

impl Facility {
    /// Converts a GeoJSON [Feature] into a [Facility].
    ///
    /// The id is taken from the feature's `id` member, falling back to the `id`
    /// property; both may be numbers or numeric strings. Returns `None` if neither
    /// is usable.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let properties = feature.properties.clone().unwrap_or_default();

        let id = match &feature.id {
            Some(Id::Number(n)) => n.as_i64(),
            Some(Id::String(s)) => s.trim().parse().ok(),
            None => None,
        }
        .or_else(|| properties.get("id").and_then(json_to_id))?;

        let name = properties
            .get("name")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        let location = feature.geometry.as_ref().and_then(|g| match &g.value {
            Value::Point(p) if p.len() >= 2 => Some(Point::new(p[0], p[1])),
            _ => None,
        });

        Some(Self {
            id,
            name,
            location,
            properties,
        })
    }
}

fn json_to_id(v: &JsonValue) -> Option<i64> {
    match v {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The set of facilities a [Router](crate::Router) serves, alongside
/// the GeoJSON document they were read from (if any).
///
/// The core never interprets the document - it is handed back unchanged
/// to whoever needs to list the facilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilitySet {
    records: Vec<Facility>,
    document: Option<GeoJson>,
}

impl FacilitySet {
    pub fn new(records: Vec<Facility>) -> Self {
        Self {
            records,
            document: None,
        }
    }

    /// Extracts all [Facilities](Facility) from a GeoJSON document, keeping the document.
    /// Features without a usable id are skipped with a warning.
    pub fn from_geojson(document: GeoJson) -> Self {
        let features: &[Feature] = match &document {
            GeoJson::FeatureCollection(fc) => &fc.features,
            GeoJson::Feature(f) => std::slice::from_ref(f),
            GeoJson::Geometry(_) => &[],
        };

        let records = features
            .iter()
            .enumerate()
            .filter_map(|(i, f)| {
                let facility = Facility::from_feature(f);
                if facility.is_none() {
                    log::warn!("facility feature {i}: missing numeric id, skipping");
                }
                facility
            })
            .collect::<Vec<_>>();

        log::debug!("loaded {} facilities", records.len());

        Self {
            records,
            document: Some(document),
        }
    }

    /// Returns all facility records.
    pub fn records(&self) -> &[Facility] {
        &self.records
    }

    /// Returns the GeoJSON document the facilities were read from.
    pub fn document(&self) -> Option<&GeoJson> {
        self.document.as_ref()
    }

    /// Retrieves a [Facility] with the provided id.
    pub fn get(&self, id: i64) -> Option<&Facility> {
        self.records.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 12,
                "geometry": {"type": "Point", "coordinates": [74.31, 31.52]},
                "properties": {"name": "Mayo Hospital"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [74.35, 31.49]},
                "properties": {"id": "34", "name": "Services Hospital", "beds": 1200}
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {"id": 56}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [74.0, 31.0]},
                "properties": {"name": "No id"}
            }
        ]
    }"#;

    #[test]
    fn from_geojson() {
        let doc: GeoJson = DOCUMENT.parse().unwrap();
        let set = FacilitySet::from_geojson(doc.clone());

        assert_eq!(set.len(), 3);
        assert_eq!(set.document(), Some(&doc));

        let mayo = set.get(12).unwrap();
        assert_eq!(mayo.name.as_deref(), Some("Mayo Hospital"));
        assert_eq!(mayo.location, Some(Point::new(74.31, 31.52)));

        let services = set.get(34).unwrap();
        assert_eq!(services.name.as_deref(), Some("Services Hospital"));
        assert_eq!(services.properties.get("beds"), Some(&JsonValue::from(1200)));

        let bare = set.get(56).unwrap();
        assert_eq!(bare.name, None);
        assert_eq!(bare.location, None);
    }

    #[test]
    fn records_only() {
        let set = FacilitySet::new(vec![]);
        assert!(set.is_empty());
        assert!(set.document().is_none());
    }
}

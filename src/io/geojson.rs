// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! GeoJSON export and import.
//!
//! Markers become Point features and each person's path becomes a
//! LineString feature. The round trip is lossy on purpose: tags and years
//! are not written, and on import LineStrings only contribute their color,
//! since paths are always derived from markers.

use crate::error::{Error, Result};
use crate::models::color::{Color, ColorMap};
use crate::models::marker::Marker;
use crate::session::paths::Path;
use crate::util::geometry::{from_lng_lat, to_lng_lat};
use serde::Serialize;
use serde_json::{Map, Value};

/// Top-level GeoJSON document.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Properties {
    Marker {
        name: String,
        description: String,
        #[serde(rename = "imageUrl")]
        image_url: Option<String>,
        #[serde(rename = "type")]
        kind: &'static str,
    },
    Path {
        name: String,
        color: Color,
        #[serde(rename = "type")]
        kind: &'static str,
    },
}

/// Markers and colors recovered from a GeoJSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoJsonImport {
    pub markers: Vec<Marker>,
    pub name_colors: ColorMap,
}

/// Build a FeatureCollection: every marker, then every path.
pub fn export<'a, I>(markers: &[Marker], paths: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a Path>,
{
    let points = markers.iter().map(|marker| Feature {
        kind: "Feature",
        geometry: Geometry::Point {
            coordinates: to_lng_lat(&marker.position),
        },
        properties: Properties::Marker {
            name: marker.name.clone(),
            description: marker.description.clone(),
            image_url: marker.image.clone(),
            kind: "marker",
        },
    });
    let lines = paths.into_iter().map(|path| Feature {
        kind: "Feature",
        geometry: Geometry::LineString {
            coordinates: path.points.iter().map(to_lng_lat).collect(),
        },
        properties: Properties::Path {
            name: path.name.clone(),
            color: path.color,
            kind: "path",
        },
    });

    FeatureCollection {
        kind: "FeatureCollection",
        features: points.chain(lines).collect(),
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidImportFormat(message.into())
}

/// Parse a GeoJSON document into markers and colors.
///
/// Features that are not `"Feature"` and geometries other than Point and
/// LineString are skipped. Anything malformed in a Point or a colored
/// LineString aborts the whole import.
pub fn import(document: &str) -> Result<GeoJsonImport> {
    let value: Value = serde_json::from_str(document)
        .map_err(|e| invalid(format!("Not valid JSON: {e}")))?;
    import_value(&value)
}

pub fn import_value(value: &Value) -> Result<GeoJsonImport> {
    if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(invalid("Expected a FeatureCollection"));
    }
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("FeatureCollection has no features array"))?;

    let mut result = GeoJsonImport::default();
    for (idx, feature) in features.iter().enumerate() {
        if feature.get("type").and_then(Value::as_str) != Some("Feature") {
            continue;
        }
        let empty = Map::new();
        let properties = feature
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let geometry_type = feature
            .get("geometry")
            .and_then(|g| g.get("type"))
            .and_then(Value::as_str);

        match geometry_type {
            Some("Point") => result.markers.push(point_marker(idx, feature, properties)?),
            Some("LineString") => {
                let name = properties.get("name").and_then(Value::as_str);
                let color = properties.get("color").and_then(Value::as_str);
                if let (Some(name), Some(color)) = (name, color) {
                    let color = color
                        .parse::<Color>()
                        .map_err(|e| invalid(format!("Feature {idx}: {e}")))?;
                    result.name_colors.insert(name.to_string(), color);
                }
            }
            other => log::debug!("Skipping feature {} with geometry {:?}", idx, other),
        }
    }

    let markers = &result.markers;
    result
        .name_colors
        .retain(|name, _| markers.iter().any(|m| &m.name == name));

    log::info!(
        "Parsed GeoJSON: {} markers, {} colors",
        result.markers.len(),
        result.name_colors.len()
    );
    Ok(result)
}

fn point_marker(idx: usize, feature: &Value, properties: &Map<String, Value>) -> Result<Marker> {
    // Only lng and lat must be numbers; an altitude is ignored.
    let position = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(Value::as_array)
        .and_then(|coords| {
            let lng_lat = coords
                .get(..2)?
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()?;
            from_lng_lat(&lng_lat)
        })
        .ok_or_else(|| invalid(format!("Feature {idx}: Point needs numeric [lng, lat] coordinates")))?;
    let name = properties
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("Feature {idx}: Point has no name")))?;

    let mut marker = Marker::new(position, name);
    marker.description = properties
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    marker.image = properties
        .get("imageUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);
    marker
        .validate()
        .map_err(|e| invalid(format!("Feature {idx}: {e}")))?;
    Ok(marker)
}

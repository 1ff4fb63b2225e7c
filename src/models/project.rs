// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data structures.
//!
//! This module defines a named project, the shape a project takes inside
//! the persisted collection, and the transfer document used for full
//! fidelity export and import.

use super::color::{Color, ColorMap};
use super::marker::{Marker, MarkerRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named, independently persisted collection of markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub name: String,
    /// Insertion order preserved.
    pub markers: Vec<Marker>,
    pub name_colors: ColorMap,
}

impl Project {
    /// Create an empty project with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            name_colors: ColorMap::new(),
        }
    }
}

/// A project as it is written under the collection key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredProject {
    pub markers: Vec<MarkerRecord>,
    #[serde(rename = "nameColors")]
    pub name_colors: ColorMap,
}

/// Markers and colors recovered from a stored project.
#[derive(Debug, Default)]
pub struct DecodedProject {
    pub markers: Vec<Marker>,
    pub name_colors: ColorMap,
    /// One line per entry that was dropped.
    pub skipped: Vec<String>,
}

impl StoredProject {
    /// Read a stored project back entry by entry.
    ///
    /// Older collections stored a bare marker list with no colors, so both
    /// shapes are accepted. A marker record or color that does not parse or
    /// validate is dropped and noted in [`DecodedProject::skipped`]; the
    /// rest of the project survives. Anything else is an error.
    pub fn decode(value: Value) -> std::result::Result<DecodedProject, String> {
        let mut decoded = DecodedProject::default();
        let (records, colors) = match value {
            Value::Array(records) => (records, Map::new()),
            Value::Object(mut fields) => {
                let records = match fields.remove("markers") {
                    Some(Value::Array(records)) => records,
                    Some(other) => return Err(format!("markers is not a list: {other}")),
                    None => return Err("no markers field".to_string()),
                };
                let colors = match fields.remove("nameColors") {
                    Some(Value::Object(colors)) => colors,
                    None | Some(Value::Null) => Map::new(),
                    Some(other) => {
                        decoded
                            .skipped
                            .push(format!("nameColors is not an object: {other}"));
                        Map::new()
                    }
                };
                (records, colors)
            }
            other => return Err(format!("unexpected project value: {other}")),
        };

        for (idx, record) in records.into_iter().enumerate() {
            let marker = serde_json::from_value::<MarkerRecord>(record)
                .map_err(|e| e.to_string())
                .and_then(|record| Marker::try_from(record).map_err(|e| e.to_string()));
            match marker {
                Ok(marker) => decoded.markers.push(marker),
                Err(reason) => decoded.skipped.push(format!("marker {idx}: {reason}")),
            }
        }
        for (person, raw) in colors {
            match serde_json::from_value::<Color>(raw) {
                Ok(color) => {
                    decoded.name_colors.insert(person, color);
                }
                Err(e) => decoded.skipped.push(format!("color of '{person}': {e}")),
            }
        }
        Ok(decoded)
    }
}

/// Full fidelity export of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDocument {
    pub project_name: String,
    pub markers: Vec<MarkerRecord>,
    pub name_colors: ColorMap,
}

impl From<&Project> for TransferDocument {
    fn from(project: &Project) -> Self {
        Self {
            project_name: project.name.clone(),
            markers: project.markers.iter().map(MarkerRecord::from).collect(),
            name_colors: project.name_colors.clone(),
        }
    }
}

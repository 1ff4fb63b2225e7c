// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transfer document and GeoJSON serialization.
//!
//! This module handles exporting and importing project data in JSON and
//! YAML transfer documents, and writing GeoJSON, to strings or files.

use crate::error::{Error, Result};
use crate::io::geojson::FeatureCollection;
use crate::models::project::TransferDocument;
use anyhow::Context;
use serde_json::Value;
use std::path::Path;

/// File formats selected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    GeoJson,
}

impl FileFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Some(FileFormat::Json),
            Some("yaml") | Some("yml") => Some(FileFormat::Yaml),
            Some("geojson") => Some(FileFormat::GeoJson),
            _ => None,
        }
    }
}

/// Serialize a transfer document as JSON.
pub fn transfer_to_json(doc: &TransferDocument, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    }
}

/// Serialize a transfer document as YAML.
pub fn transfer_to_yaml(doc: &TransferDocument) -> serde_yaml::Result<String> {
    serde_yaml::to_string(doc)
}

/// Parse a JSON transfer document, checking required fields first.
pub fn transfer_from_json(text: &str) -> Result<TransferDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::InvalidImportFormat(format!("Not valid JSON: {e}")))?;
    transfer_from_value(value)
}

/// Parse a YAML transfer document, checking required fields first.
pub fn transfer_from_yaml(text: &str) -> Result<TransferDocument> {
    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| Error::InvalidImportFormat(format!("Not valid YAML: {e}")))?;
    transfer_from_value(value)
}

/// Validate presence and shape of `projectName`, `markers` and `nameColors`.
pub fn transfer_from_value(value: Value) -> Result<TransferDocument> {
    let has_name = value
        .get("projectName")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    let has_markers = value.get("markers").is_some_and(Value::is_array);
    let has_colors = value.get("nameColors").is_some_and(Value::is_object);
    if !(has_name && has_markers && has_colors) {
        return Err(Error::InvalidImportFormat(
            "Invalid project file format: projectName, markers and nameColors are required"
                .to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidImportFormat(e.to_string()))
}

/// Serialize a GeoJSON document.
pub fn geojson_to_string(doc: &FeatureCollection, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    }
}

/// Export a transfer document to a `.json`, `.yaml` or `.yml` file.
pub fn export_transfer(doc: &TransferDocument, path: &Path, pretty: bool) -> anyhow::Result<()> {
    let text = match FileFormat::from_path(path) {
        Some(FileFormat::Yaml) => transfer_to_yaml(doc)?,
        Some(FileFormat::Json) => transfer_to_json(doc, pretty)?,
        other => anyhow::bail!("Unsupported transfer file extension: {:?}", other),
    };
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Import a transfer document from a `.json`, `.yaml` or `.yml` file.
pub fn import_transfer(path: &Path) -> anyhow::Result<TransferDocument> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = match FileFormat::from_path(path) {
        Some(FileFormat::Yaml) => transfer_from_yaml(&text)?,
        Some(FileFormat::Json) => transfer_from_json(&text)?,
        other => anyhow::bail!("Unsupported transfer file extension: {:?}", other),
    };
    Ok(doc)
}

/// Write a GeoJSON document to a file.
pub fn export_geojson(doc: &FeatureCollection, path: &Path, pretty: bool) -> anyhow::Result<()> {
    let text = geojson_to_string(doc, pretty)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Named project persistence.
//!
//! All projects live in one JSON object under a single collection key of the
//! key-value store. Every write re-serializes and replaces the whole
//! collection, so a failed write leaves the previous collection intact.

use crate::error::{Error, Result};
use crate::io::geojson::{self, FeatureCollection, GeoJsonImport};
use crate::io::storage::{KeyValueStore, StorageError};
use crate::models::color::ColorMap;
use crate::models::marker::{Marker, MarkerRecord};
use crate::models::project::{DecodedProject, Project, StoredProject, TransferDocument};
use crate::session::colors::ColorAssigner;
use crate::session::marker_store::MarkerStore;
use crate::session::paths::PathBuilder;
use serde_json::{Map, Value};

/// Collection key used by default.
pub const DEFAULT_COLLECTION_KEY: &str = "mapProjects";

const EXPORT_COLOR_SEED: u64 = 0;

/// Load, save and exchange projects against a [`KeyValueStore`].
pub struct ProjectRepository<S> {
    store: S,
    collection_key: String,
}

impl<S: KeyValueStore> ProjectRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_collection_key(store, DEFAULT_COLLECTION_KEY)
    }

    pub fn with_collection_key(store: S, collection_key: impl Into<String>) -> Self {
        Self {
            store,
            collection_key: collection_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn read_collection(&self) -> Result<Map<String, Value>> {
        let Some(text) = self.store.get(&self.collection_key)? else {
            return Ok(Map::new());
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        let corrupt = |reason: String| StorageError::Corrupt {
            key: self.collection_key.clone(),
            reason,
        };
        match serde_json::from_str::<Value>(&text).map_err(|e| corrupt(e.to_string()))? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(corrupt("collection is not a JSON object".to_string()).into()),
        }
    }

    fn write_collection(&mut self, collection: &Map<String, Value>) -> Result<()> {
        let text = serde_json::to_string(collection).map_err(|e| StorageError::Corrupt {
            key: self.collection_key.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&self.collection_key, &text)?;
        Ok(())
    }

    fn stored_value(markers: &[Marker], name_colors: &ColorMap) -> Result<Value> {
        let stored = StoredProject {
            markers: markers.iter().map(MarkerRecord::from).collect(),
            name_colors: name_colors.clone(),
        };
        serde_json::to_value(stored).map_err(|e| {
            Error::StorageUnavailable(StorageError::Unavailable(format!(
                "cannot encode project: {e}"
            )))
        })
    }

    /// Project names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.read_collection()?.keys().cloned().collect())
    }

    /// Create an empty project.
    pub fn create(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Validation("Please enter a project name".to_string()));
        }
        let mut collection = self.read_collection()?;
        if collection.contains_key(name) {
            return Err(Error::DuplicateProject(name.to_string()));
        }
        collection.insert(name.to_string(), Self::stored_value(&[], &ColorMap::new())?);
        self.write_collection(&collection)?;
        log::info!("Created project '{}'", name);
        Ok(())
    }

    /// Load a project.
    ///
    /// Stored entries that no longer parse are skipped; a value of the wrong
    /// shape altogether yields an empty project.
    pub fn load(&self, name: &str) -> Result<Project> {
        let mut collection = self.read_collection()?;
        let value = collection
            .remove(name)
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;

        let decoded = match StoredProject::decode(value) {
            Ok(decoded) => decoded,
            Err(reason) => {
                log::warn!("Project '{}' is malformed, loading it empty: {}", name, reason);
                DecodedProject::default()
            }
        };
        for reason in &decoded.skipped {
            log::warn!("Skipping stored entry in '{}': {}", name, reason);
        }
        let DecodedProject {
            markers,
            name_colors,
            ..
        } = decoded;

        log::debug!("Loaded project '{}' with {} markers", name, markers.len());
        Ok(Project {
            name: name.to_string(),
            markers,
            name_colors,
        })
    }

    /// Replace the stored markers and colors of a project.
    pub fn save(&mut self, name: &str, markers: &[Marker], name_colors: &ColorMap) -> Result<()> {
        let mut collection = self.read_collection()?;
        collection.insert(name.to_string(), Self::stored_value(markers, name_colors)?);
        self.write_collection(&collection)?;
        log::debug!("Saved project '{}' ({} markers)", name, markers.len());
        Ok(())
    }

    /// Remove a project, returning whether it existed.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let mut collection = self.read_collection()?;
        if collection.remove(name).is_none() {
            return Ok(false);
        }
        self.write_collection(&collection)?;
        log::info!("Deleted project '{}'", name);
        Ok(true)
    }

    /// Full fidelity export of a stored project.
    pub fn export_project(&self, name: &str) -> Result<TransferDocument> {
        Ok(TransferDocument::from(&self.load(name)?))
    }

    /// Store a transfer document as a project.
    ///
    /// An existing project of the same name is only replaced when
    /// `overwrite` is set. Any invalid marker aborts the import.
    pub fn import_project(&mut self, document: TransferDocument, overwrite: bool) -> Result<Project> {
        if document.project_name.trim().is_empty() {
            return Err(Error::InvalidImportFormat("projectName is required".to_string()));
        }
        let markers = document
            .markers
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                Marker::try_from(record)
                    .map_err(|e| Error::InvalidImportFormat(format!("Marker {idx}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        self.put_project(&document.project_name, markers, document.name_colors, overwrite)
    }

    /// Export a stored project as GeoJSON, paths drawn in stored order.
    ///
    /// A person without a stored color gets one from a fixed seed, so the
    /// same stored project always exports the same document.
    pub fn export_geojson(&self, name: &str) -> Result<FeatureCollection> {
        let project = self.load(name)?;
        let store = MarkerStore::from_markers(project.markers);
        let mut colors = ColorAssigner::seeded(EXPORT_COLOR_SEED);
        colors.restore(project.name_colors);
        let mut paths = PathBuilder::new();
        paths.rebuild_all(&store, &mut colors);
        Ok(geojson::export(store.as_slice(), paths.iter()))
    }

    /// Parse a GeoJSON document into markers and colors without storing it.
    pub fn import_geojson(&self, document: &str) -> Result<GeoJsonImport> {
        geojson::import(document)
    }

    /// Store markers and colors under `name`, deduplicating positions.
    ///
    /// Colors for names without markers are dropped.
    pub fn put_project(
        &mut self,
        name: &str,
        markers: Vec<Marker>,
        mut name_colors: ColorMap,
        overwrite: bool,
    ) -> Result<Project> {
        let mut collection = self.read_collection()?;
        if collection.contains_key(name) && !overwrite {
            return Err(Error::DuplicateProject(name.to_string()));
        }
        let store = MarkerStore::from_markers(markers);
        name_colors.retain(|person, _| store.count_by_name(person) > 0);

        let project = Project {
            name: name.to_string(),
            markers: store.as_slice().to_vec(),
            name_colors,
        };
        collection.insert(
            name.to_string(),
            Self::stored_value(&project.markers, &project.name_colors)?,
        );
        self.write_collection(&collection)?;
        log::info!(
            "Imported project '{}' with {} markers",
            name,
            project.markers.len()
        );
        Ok(project)
    }
}

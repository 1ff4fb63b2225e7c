// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory marker storage for the active project.
//!
//! Markers are keyed by their exact position and iterate in insertion order.
//! Replacing the marker at an occupied position keeps the original slot, so
//! paths built from the store do not reorder when a marker is overwritten.

use crate::error::{Error, Result};
use crate::models::marker::{Marker, MarkerPatch, PositionKey};

/// What is on the map right now for the active project.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from markers in order, later duplicates replacing earlier ones.
    pub fn from_markers<I>(markers: I) -> Self
    where
        I: IntoIterator<Item = Marker>,
    {
        let mut store = Self::new();
        for marker in markers {
            store.add(marker);
        }
        store
    }

    fn index_of(&self, key: PositionKey) -> Option<usize> {
        self.markers.iter().position(|m| m.key() == key)
    }

    /// Insert a marker keyed by its position.
    ///
    /// Returns the key along with the marker it replaced, if the position was
    /// already occupied.
    pub fn add(&mut self, marker: Marker) -> (PositionKey, Option<Marker>) {
        let key = marker.key();
        match self.index_of(key) {
            Some(idx) => {
                let replaced = std::mem::replace(&mut self.markers[idx], marker);
                (key, Some(replaced))
            }
            None => {
                self.markers.push(marker);
                (key, None)
            }
        }
    }

    /// Remove and return the marker at `key`.
    pub fn remove(&mut self, key: PositionKey) -> Option<Marker> {
        self.index_of(key).map(|idx| self.markers.remove(idx))
    }

    /// Merge `patch` into the marker at `key`, returning the previous record.
    pub fn update(&mut self, key: PositionKey, patch: MarkerPatch) -> Result<Marker> {
        let idx = self
            .index_of(key)
            .ok_or_else(|| Error::MarkerNotFound(key.position()))?;
        let previous = self.markers[idx].clone();
        self.markers[idx].apply(patch);
        Ok(previous)
    }

    pub fn get(&self, key: PositionKey) -> Option<&Marker> {
        self.index_of(key).map(|idx| &self.markers[idx])
    }

    /// All markers whose name matches exactly, in store order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Marker> + 'a {
        self.markers.iter().filter(move |m| m.name == name)
    }

    pub fn count_by_name(&self, name: &str) -> usize {
        self.find_by_name(name).count()
    }

    /// Distinct person names in first-appearance order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for marker in &self.markers {
            if !names.contains(&marker.name.as_str()) {
                names.push(&marker.name);
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

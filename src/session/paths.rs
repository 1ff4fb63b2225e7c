// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-person connective paths.
//!
//! A path is derived data: for every person with at least two markers it
//! visits that person's markers in store order. Paths are rebuilt wholesale
//! whenever a person's markers change and are never persisted.

use super::colors::ColorAssigner;
use super::marker_store::MarkerStore;
use crate::models::color::Color;
use crate::models::marker::Position;
use std::collections::BTreeMap;

/// Polyline connecting one person's markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub name: String,
    pub color: Color,
    pub points: Vec<Position>,
}

/// Current set of paths, one per person with two or more markers.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    paths: BTreeMap<String, Path>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the path for `name` from the store.
    ///
    /// Fewer than two matching markers removes any existing path.
    pub fn rebuild(&mut self, name: &str, store: &MarkerStore, colors: &mut ColorAssigner) {
        let points: Vec<Position> = store.find_by_name(name).map(|m| m.position).collect();
        if points.len() < 2 {
            if self.paths.remove(name).is_some() {
                log::debug!("Removed path for '{}'", name);
            }
            return;
        }
        let path = Path {
            name: name.to_string(),
            color: colors.color_for(name),
            points,
        };
        log::debug!("Rebuilt path for '{}' with {} points", name, path.points.len());
        self.paths.insert(name.to_string(), path);
    }

    /// Rebuild paths for every person in the store, dropping all others.
    pub fn rebuild_all(&mut self, store: &MarkerStore, colors: &mut ColorAssigner) {
        self.paths.clear();
        for name in store.names() {
            self.rebuild(name, store, colors);
        }
    }

    /// Pick up a color change without touching geometry.
    pub fn recolor(&mut self, name: &str, color: Color) {
        if let Some(path) = self.paths.get_mut(name) {
            path.color = color;
        }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.paths.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.values()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

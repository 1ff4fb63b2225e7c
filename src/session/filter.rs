// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tag index and visibility filtering.
//!
//! Two independent filters decide what is shown: a single-select name filter
//! and a multi-select tag filter. A marker is visible when it passes both.
//! Within the tag filter, any selected tag on the marker is enough.

use super::marker_store::MarkerStore;
use super::paths::{Path, PathBuilder};
use crate::models::marker::Marker;
use std::collections::BTreeSet;

/// Single-select filter by person name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NameFilter {
    #[default]
    All,
    Only(String),
}

impl NameFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::All => true,
            NameFilter::Only(selected) => selected == name,
        }
    }
}

impl From<Option<String>> for NameFilter {
    fn from(name: Option<String>) -> Self {
        name.map_or(NameFilter::All, NameFilter::Only)
    }
}

/// Derives the tags in use and tracks which of them are selected.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    selection: BTreeSet<String>,
}

impl TagIndex {
    /// Union of every marker's tags.
    pub fn all_tags(store: &MarkerStore) -> BTreeSet<String> {
        store.iter().flat_map(|m| m.tags.iter().cloned()).collect()
    }

    /// Flip membership of `tag`, returning whether it is now selected.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.selection.remove(tag) {
            false
        } else {
            self.selection.insert(tag.to_string());
            true
        }
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        self.selection.contains(tag)
    }

    /// An empty selection lets everything through.
    pub fn matches(&self, marker: &Marker) -> bool {
        self.selection.is_empty() || marker.has_any_tag(&self.selection)
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }
}

/// Combined filter state for the active project.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub name: NameFilter,
    pub tags: TagIndex,
}

impl FilterState {
    pub fn is_visible(&self, marker: &Marker) -> bool {
        self.name.matches(&marker.name) && self.tags.matches(marker)
    }

    pub fn reset(&mut self) {
        self.name = NameFilter::All;
        self.tags.clear();
    }
}

/// Applies a [`FilterState`] to the session's markers and paths.
pub struct FilterEngine<'a> {
    state: &'a FilterState,
    store: &'a MarkerStore,
    paths: &'a PathBuilder,
}

impl<'a> FilterEngine<'a> {
    pub fn new(state: &'a FilterState, store: &'a MarkerStore, paths: &'a PathBuilder) -> Self {
        Self {
            state,
            store,
            paths,
        }
    }

    /// Markers passing both filters, in store order.
    pub fn visible_markers(&self) -> Vec<&'a Marker> {
        let state = self.state;
        let store: &'a MarkerStore = self.store;
        store.iter().filter(|m| state.is_visible(m)).collect()
    }

    /// Paths with at least one visible marker for their person.
    pub fn visible_paths(&self) -> Vec<&'a Path> {
        let state = self.state;
        let store = self.store;
        let paths: &'a PathBuilder = self.paths;
        paths
            .iter()
            .filter(|path| store.find_by_name(&path.name).any(|m| state.is_visible(m)))
            .collect()
    }
}

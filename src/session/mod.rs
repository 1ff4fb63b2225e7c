// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Working set for the active project.
//!
//! [`ActiveProjectSession`] owns the marker store, color assignments, derived
//! paths and filter state for exactly one project. Every mutation keeps them
//! consistent: marker change first, then color and path recompute.

pub mod colors;
pub mod filter;
pub mod marker_store;
pub mod paths;

use crate::error::{Error, Result};
use crate::models::color::Color;
use crate::models::marker::{Marker, MarkerPatch, PositionKey};
use crate::models::project::Project;
use colors::ColorAssigner;
use filter::{FilterEngine, FilterState, NameFilter};
use marker_store::MarkerStore;
use paths::PathBuilder;

/// Transient state for the project currently being edited.
#[derive(Debug, Clone)]
pub struct ActiveProjectSession {
    name: String,
    markers: MarkerStore,
    colors: ColorAssigner,
    paths: PathBuilder,
    filter: FilterState,
}

impl ActiveProjectSession {
    /// Build the working set from a loaded project.
    ///
    /// Stored colors are kept for names that still have markers; names
    /// without a stored color get a fresh one.
    pub fn open(project: Project, mut colors: ColorAssigner) -> Self {
        let markers = MarkerStore::from_markers(project.markers);
        colors.restore(project.name_colors);
        colors.retain(|name| markers.count_by_name(name) > 0);
        for name in markers.names() {
            colors.color_for(name);
        }
        let mut paths = PathBuilder::new();
        paths.rebuild_all(&markers, &mut colors);

        Self {
            name: project.name,
            markers,
            colors,
            paths,
            filter: FilterState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn colors(&self) -> &ColorAssigner {
        &self.colors
    }

    pub fn paths(&self) -> &PathBuilder {
        &self.paths
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn engine(&self) -> FilterEngine<'_> {
        FilterEngine::new(&self.filter, &self.markers, &self.paths)
    }

    /// Snapshot suitable for persisting.
    pub fn to_project(&self) -> Project {
        Project {
            name: self.name.clone(),
            markers: self.markers.as_slice().to_vec(),
            name_colors: self.colors.assignments().clone(),
        }
    }

    /// Place a marker, replacing whatever occupied its position.
    pub fn add_marker(&mut self, marker: Marker) -> Result<PositionKey> {
        marker.validate()?;
        let name = marker.name.clone();
        let (key, replaced) = self.markers.add(marker);
        if let Some(old) = replaced.filter(|old| old.name != name) {
            self.settle_name(&old.name);
        }
        self.colors.color_for(&name);
        self.paths.rebuild(&name, &self.markers, &mut self.colors);
        Ok(key)
    }

    /// Merge `patch` into the marker at `key`.
    ///
    /// On a rename both the old and the new person's path are rebuilt, and the
    /// old person's color is released if they have no markers left.
    pub fn update_marker(&mut self, key: PositionKey, patch: MarkerPatch) -> Result<()> {
        let current = self
            .markers
            .get(key)
            .ok_or_else(|| Error::MarkerNotFound(key.position()))?;
        let mut candidate = current.clone();
        candidate.apply(patch.clone());
        candidate.validate()?;

        let previous = self.markers.update(key, patch)?;
        let name = candidate.name;
        if previous.name != name {
            self.settle_name(&previous.name);
        }
        self.colors.color_for(&name);
        self.paths.rebuild(&name, &self.markers, &mut self.colors);
        Ok(())
    }

    /// Delete the marker at `key`, cleaning up its person's path and color.
    pub fn remove_marker(&mut self, key: PositionKey) -> Result<Marker> {
        let removed = self
            .markers
            .remove(key)
            .ok_or_else(|| Error::MarkerNotFound(key.position()))?;
        self.settle_name(&removed.name);
        Ok(removed)
    }

    /// Override the color of a person who has markers.
    pub fn set_color(&mut self, name: &str, color: Color) -> Result<()> {
        if self.markers.count_by_name(name) == 0 {
            return Err(Error::Validation(format!("No markers for '{name}'")));
        }
        self.colors.set_color(name, color);
        self.paths.recolor(name, color);
        Ok(())
    }

    /// Select a single person, or `None` for everyone.
    pub fn set_name_filter(&mut self, name: Option<String>) {
        self.filter.name = NameFilter::from(name);
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.filter.tags.toggle(tag)
    }

    /// Rebuild a person's path after their marker set shrank, releasing the
    /// color (and any name filter on them) once none remain.
    fn settle_name(&mut self, name: &str) {
        self.paths.rebuild(name, &self.markers, &mut self.colors);
        if self.markers.count_by_name(name) == 0 {
            self.colors.release(name);
            if self.filter.name == NameFilter::Only(name.to_string()) {
                self.filter.name = NameFilter::All;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::color::ColorMap;
    use crate::models::marker::Position;

    fn session() -> ActiveProjectSession {
        ActiveProjectSession::open(Project::new("Trip"), ColorAssigner::seeded(11))
    }

    fn at(lat: f64) -> Position {
        Position::new(lat, 0.0)
    }

    fn rename(to: &str) -> MarkerPatch {
        MarkerPatch {
            name: Some(to.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_named_marker_has_color() {
        let mut s = session();
        s.add_marker(Marker::new(at(1.0), "Alice")).unwrap();
        assert!(s.colors().contains("Alice"));
        assert!(s.paths().get("Alice").is_none());

        s.add_marker(Marker::new(at(2.0), "Alice")).unwrap();
        assert!(s.paths().get("Alice").is_some());
    }

    #[test]
    fn test_blank_name_rejected_without_change() {
        let mut s = session();
        let err = s.add_marker(Marker::new(at(1.0), "  ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(s.markers().is_empty());
        assert_eq!(s.colors().assignments().len(), 0);
    }

    #[test]
    fn test_rename_moves_path_and_color() {
        let mut s = session();
        let a1 = s.add_marker(Marker::new(at(1.0), "A")).unwrap();
        s.add_marker(Marker::new(at(2.0), "A")).unwrap();
        s.add_marker(Marker::new(at(3.0), "B")).unwrap();
        assert!(s.paths().get("A").is_some());
        assert!(s.paths().get("B").is_none());

        s.update_marker(a1, rename("B")).unwrap();
        assert!(s.paths().get("A").is_none());
        assert!(s.paths().get("B").is_some());
        // One A marker remains, so A keeps its color.
        assert!(s.colors().contains("A"));
    }

    #[test]
    fn test_rename_last_marker_releases_color() {
        let mut s = session();
        let a1 = s.add_marker(Marker::new(at(1.0), "A")).unwrap();
        s.set_name_filter(Some("A".to_string()));
        s.update_marker(a1, rename("B")).unwrap();
        assert!(!s.colors().contains("A"));
        assert!(s.colors().contains("B"));
        assert_eq!(s.filter().name, NameFilter::All);
    }

    #[test]
    fn test_update_rejects_blank_rename() {
        let mut s = session();
        let key = s.add_marker(Marker::new(at(1.0), "A")).unwrap();
        assert!(s.update_marker(key, rename("")).is_err());
        assert_eq!(s.markers().get(key).unwrap().name, "A");
    }

    #[test]
    fn test_delete_only_markers_removes_path_and_color() {
        let mut s = session();
        let a1 = s.add_marker(Marker::new(at(1.0), "Alice")).unwrap();
        let a2 = s.add_marker(Marker::new(at(2.0), "Alice")).unwrap();
        s.add_marker(Marker::new(at(3.0), "Bob")).unwrap();
        let bob_color = s.colors().get("Bob");

        s.remove_marker(a1).unwrap();
        s.remove_marker(a2).unwrap();
        assert!(s.paths().get("Alice").is_none());
        assert!(!s.colors().contains("Alice"));
        assert_eq!(s.colors().get("Bob"), bob_color);
        assert_eq!(s.markers().len(), 1);
    }

    #[test]
    fn test_overwrite_by_other_person_releases_previous() {
        let mut s = session();
        s.add_marker(Marker::new(at(1.0), "Alice")).unwrap();
        s.add_marker(Marker::new(at(1.0), "Bob")).unwrap();
        assert_eq!(s.markers().len(), 1);
        assert!(!s.colors().contains("Alice"));
        assert!(s.colors().contains("Bob"));
    }

    #[test]
    fn test_open_prunes_and_fills_colors() {
        let mut stored = ColorMap::new();
        stored.insert("Ghost".to_string(), Color::from_rgb(1, 2, 3));
        stored.insert("Alice".to_string(), Color::from_rgb(4, 5, 6));
        let project = Project {
            name: "Trip".to_string(),
            markers: vec![
                Marker::new(at(1.0), "Alice"),
                Marker::new(at(2.0), "Alice"),
                Marker::new(at(3.0), "Bob"),
            ],
            name_colors: stored,
        };
        let s = ActiveProjectSession::open(project, ColorAssigner::seeded(5));
        assert_eq!(s.colors().get("Alice"), Some(Color::from_rgb(4, 5, 6)));
        assert!(s.colors().contains("Bob"));
        assert!(!s.colors().contains("Ghost"));
        assert_eq!(s.paths().get("Alice").unwrap().color, Color::from_rgb(4, 5, 6));
    }

    #[test]
    fn test_set_color_requires_markers() {
        let mut s = session();
        let red = Color::from_rgb(255, 0, 0);
        assert!(s.set_color("Nobody", red).is_err());

        s.add_marker(Marker::new(at(1.0), "Alice")).unwrap();
        s.add_marker(Marker::new(at(2.0), "Alice")).unwrap();
        s.set_color("Alice", red).unwrap();
        assert_eq!(s.paths().get("Alice").unwrap().color, red);
    }
}

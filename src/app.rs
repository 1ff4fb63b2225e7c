// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application controller.
//!
//! This module wires user actions (place, edit, delete, switch project,
//! import/export) to the active session and the project repository. Each
//! mutating action is staged on a copy of the session, persisted, and only
//! then committed, so memory and storage never disagree after a failure.

use crate::error::{Error, Result};
use crate::io::geojson::{self, FeatureCollection};
use crate::io::storage::KeyValueStore;
use crate::models::color::Color;
use crate::models::marker::{Marker, Position, PositionKey};
use crate::models::project::{Project, TransferDocument};
use crate::repository::ProjectRepository;
use crate::session::colors::ColorAssigner;
use crate::session::filter::TagIndex;
use crate::session::paths::Path;
use crate::session::ActiveProjectSession;
use crate::ui::form::{MarkerForm, PlacementHandler};
use crate::ui::info::marker_info;
use crate::ui::surface::MapSurface;
use crate::util::geometry;
use std::collections::BTreeSet;

/// Orchestrates the active project for one user.
pub struct Controller<S, M> {
    repo: ProjectRepository<S>,
    surface: M,
    session: Option<ActiveProjectSession>,
    /// Position of a marker being placed but not yet submitted.
    pending: Option<Position>,
    /// Fixed seed for person colors; entropy when unset.
    color_seed: Option<u64>,
}

impl<S: KeyValueStore, M: MapSurface> Controller<S, M> {
    /// Create a controller with no active project.
    pub fn new(repo: ProjectRepository<S>, surface: M) -> Self {
        Self {
            repo,
            surface,
            session: None,
            pending: None,
            color_seed: None,
        }
    }

    /// Use a fixed seed for colors assigned in sessions opened from now on.
    pub fn with_color_seed(mut self, seed: u64) -> Self {
        self.color_seed = Some(seed);
        self
    }

    pub fn repository(&self) -> &ProjectRepository<S> {
        &self.repo
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn session(&self) -> Option<&ActiveProjectSession> {
        self.session.as_ref()
    }

    pub fn active_project(&self) -> Option<&str> {
        self.session.as_ref().map(ActiveProjectSession::name)
    }

    pub fn pending_placement(&self) -> Option<Position> {
        self.pending
    }

    fn new_colors(&self) -> ColorAssigner {
        match self.color_seed {
            Some(seed) => ColorAssigner::seeded(seed),
            None => ColorAssigner::new(),
        }
    }

    fn active(&self) -> Result<&ActiveProjectSession> {
        self.session.as_ref().ok_or(Error::NoActiveProject)
    }

    fn active_mut(&mut self) -> Result<&mut ActiveProjectSession> {
        self.session.as_mut().ok_or(Error::NoActiveProject)
    }

    // ---- projects ----

    pub fn projects(&self) -> Result<Vec<String>> {
        self.repo.list()
    }

    /// Create an empty project and make it active.
    pub fn create_project(&mut self, name: &str) -> Result<()> {
        self.repo.create(name)?;
        self.open_project(name)
    }

    /// Discard the current working set and rebuild it from storage.
    pub fn open_project(&mut self, name: &str) -> Result<()> {
        let project = self.repo.load(name)?;
        self.activate(project)
    }

    /// Swap in a session for `project`. Colors drawn for people the stored
    /// project had none for are saved first, so storage matches the map.
    fn activate(&mut self, project: Project) -> Result<()> {
        let stored_colors = project.name_colors.clone();
        let session = ActiveProjectSession::open(project, self.new_colors());
        if session.colors().assignments() != &stored_colors {
            let opened = session.to_project();
            self.repo
                .save(&opened.name, &opened.markers, &opened.name_colors)?;
        }
        self.cancel_pending();
        log::info!(
            "Opened project '{}' ({} markers, {} paths)",
            session.name(),
            session.markers().len(),
            session.paths().len()
        );
        self.session = Some(session);
        self.render();
        Ok(())
    }

    /// Leave the active project without touching storage.
    pub fn close_project(&mut self) {
        self.cancel_pending();
        self.session = None;
        self.surface.clear();
    }

    /// Delete a stored project; the session is closed if it was active.
    pub fn delete_project(&mut self, name: &str) -> Result<bool> {
        let existed = self.repo.delete(name)?;
        if self.active_project() == Some(name) {
            self.close_project();
        }
        Ok(existed)
    }

    // ---- markers ----

    /// Start placing a marker at `position`. Replaces any earlier pending
    /// placement.
    pub fn begin_placement(&mut self, position: Position) -> Result<()> {
        self.active()?;
        geometry::validate_position(position)?;
        self.cancel_pending();
        self.pending = Some(position);
        self.surface.show_provisional(position);
        Ok(())
    }

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.surface.remove_provisional();
        }
    }

    /// Place a complete marker directly.
    pub fn place_marker(&mut self, marker: Marker) -> Result<PositionKey> {
        let key = self.commit(|session| session.add_marker(marker))?;
        log::info!("Placed marker at {}", key);
        Ok(key)
    }

    /// Apply an edit form to the marker at `position`.
    pub fn edit_marker(&mut self, position: Position, form: MarkerForm) -> Result<()> {
        let patch = form.into_patch()?;
        self.commit(|session| session.update_marker(position.key(), patch))?;
        log::info!("Edited marker at {}", position);
        Ok(())
    }

    pub fn delete_marker(&mut self, position: Position) -> Result<Marker> {
        let removed = self.commit(|session| session.remove_marker(position.key()))?;
        log::info!("Deleted marker '{}' at {}", removed.name, position);
        Ok(removed)
    }

    /// Override the color used for a person's icons and path.
    pub fn set_color(&mut self, name: &str, color: Color) -> Result<()> {
        self.commit(|session| session.set_color(name, color))?;
        log::info!("Set color of '{}' to {}", name, color);
        Ok(())
    }

    /// Run `action` on a copy of the session, persist the result, then swap it in.
    fn commit<T, F>(&mut self, action: F) -> Result<T>
    where
        F: FnOnce(&mut ActiveProjectSession) -> Result<T>,
    {
        let mut staged = self.active()?.clone();
        let output = action(&mut staged)?;
        let project = staged.to_project();
        self.repo
            .save(&project.name, &project.markers, &project.name_colors)?;
        self.session = Some(staged);
        self.render();
        Ok(output)
    }

    // ---- filters ----

    /// Show one person only, or everyone with `None`.
    pub fn set_name_filter(&mut self, name: Option<String>) -> Result<()> {
        let session = self.active_mut()?;
        if let Some(name) = &name {
            if !session.colors().contains(name) {
                return Err(Error::Validation(format!("Unknown person '{name}'")));
            }
        }
        session.set_name_filter(name);
        self.render();
        Ok(())
    }

    /// Flip a tag in the tag filter, returning whether it is now selected.
    pub fn toggle_tag(&mut self, tag: &str) -> Result<bool> {
        let selected = self.active_mut()?.toggle_tag(tag);
        self.render();
        Ok(selected)
    }

    /// Every tag used in the active project.
    pub fn all_tags(&self) -> BTreeSet<String> {
        self.session
            .as_ref()
            .map(|s| TagIndex::all_tags(s.markers()))
            .unwrap_or_default()
    }

    /// Names offered by the name filter.
    pub fn names(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.colors().names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn visible_markers(&self) -> Vec<&Marker> {
        self.session
            .as_ref()
            .map(|s| s.engine().visible_markers())
            .unwrap_or_default()
    }

    pub fn visible_paths(&self) -> Vec<&Path> {
        self.session
            .as_ref()
            .map(|s| s.engine().visible_paths())
            .unwrap_or_default()
    }

    /// Redraw everything visible.
    fn render(&mut self) {
        self.surface.clear();
        let Some(session) = &self.session else {
            return;
        };
        let engine = session.engine();
        for marker in engine.visible_markers() {
            if let Some(color) = session.colors().get(&marker.name) {
                self.surface
                    .draw_marker(marker, color, &marker_info(marker));
            }
        }
        for path in engine.visible_paths() {
            self.surface.draw_path(path);
        }
    }

    // ---- import / export ----

    /// Transfer document of the active project as currently shown.
    pub fn export_project(&self) -> Result<TransferDocument> {
        Ok(TransferDocument::from(&self.active()?.to_project()))
    }

    pub fn export_geojson(&self) -> Result<FeatureCollection> {
        let session = self.active()?;
        Ok(geojson::export(
            session.markers().as_slice(),
            session.paths().iter(),
        ))
    }

    /// Store a transfer document and make it the active project.
    pub fn import_project(&mut self, document: TransferDocument, overwrite: bool) -> Result<()> {
        let project = self.repo.import_project(document, overwrite)?;
        self.activate(project)
    }

    /// Store a GeoJSON document under `name` and make it the active project.
    pub fn import_geojson(&mut self, document: &str, name: &str, overwrite: bool) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Validation("Please enter a project name".to_string()));
        }
        let parsed = self.repo.import_geojson(document)?;
        let project = self
            .repo
            .put_project(name, parsed.markers, parsed.name_colors, overwrite)?;
        self.activate(project)
    }
}

impl<S: KeyValueStore, M: MapSurface> PlacementHandler for Controller<S, M> {
    fn on_submit(&mut self, form: MarkerForm) -> Result<PositionKey> {
        let position = self
            .pending
            .ok_or_else(|| Error::Validation("No marker is being placed".to_string()))?;
        let marker = form.into_marker(position)?;
        let key = self.place_marker(marker)?;
        self.cancel_pending();
        Ok(key)
    }

    fn on_cancel(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::{MemoryStore, StorageError};
    use crate::models::color::ColorMap;
    use crate::ui::form::ImageInput;
    use crate::ui::surface::TextSurface;

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn controller() -> Controller<FlakyStore, TextSurface> {
        let mut c = Controller::new(ProjectRepository::new(FlakyStore::default()), TextSurface::new())
            .with_color_seed(9);
        c.create_project("Trip").unwrap();
        c
    }

    fn at(lat: f64) -> Position {
        Position::new(lat, 0.0)
    }

    fn place(c: &mut Controller<FlakyStore, TextSurface>, lat: f64, name: &str, tags: &str) {
        c.begin_placement(at(lat)).unwrap();
        c.on_submit(MarkerForm {
            tags: tags.to_string(),
            ..MarkerForm::named(name)
        })
        .unwrap();
    }

    #[test]
    fn test_actions_need_active_project() {
        let mut c = Controller::new(ProjectRepository::new(MemoryStore::new()), TextSurface::new());
        assert!(matches!(c.begin_placement(at(1.0)), Err(Error::NoActiveProject)));
        assert!(matches!(
            c.place_marker(Marker::new(at(1.0), "A")),
            Err(Error::NoActiveProject)
        ));
        assert!(c.visible_markers().is_empty());
    }

    #[test]
    fn test_submit_persists_and_draws() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "work");
        place(&mut c, 2.0, "Alice", "home");

        assert_eq!(c.pending_placement(), None);
        assert_eq!(c.repository().load("Trip").unwrap().markers.len(), 2);
        assert_eq!(c.surface().markers().len(), 2);
        assert_eq!(c.surface().paths().len(), 1);
    }

    #[test]
    fn test_cancel_rolls_back_provisional() {
        let mut c = controller();
        c.begin_placement(at(1.0)).unwrap();
        assert_eq!(c.surface().provisional(), Some(at(1.0)));
        c.on_cancel();
        assert_eq!(c.surface().provisional(), None);
        assert!(c.session().unwrap().markers().is_empty());
        assert!(c.on_submit(MarkerForm::named("Alice")).is_err());
    }

    #[test]
    fn test_invalid_submit_keeps_placement_open() {
        let mut c = controller();
        c.begin_placement(at(1.0)).unwrap();
        assert!(matches!(c.on_submit(MarkerForm::default()), Err(Error::Validation(_))));
        assert_eq!(c.pending_placement(), Some(at(1.0)));
        assert!(c.repository().load("Trip").unwrap().markers.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "");
        c.repo.store_mut().fail_writes = true;

        let err = c
            .edit_marker(at(1.0), MarkerForm::named("Bob"))
            .unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));

        let session = c.session().unwrap();
        assert_eq!(session.markers().get(at(1.0).key()).unwrap().name, "Alice");
        assert!(session.colors().contains("Alice"));
        assert!(!session.colors().contains("Bob"));
        assert_eq!(c.repository().load("Trip").unwrap().markers[0].name, "Alice");
    }

    #[test]
    fn test_edit_keeps_image_unless_replaced() {
        let mut c = controller();
        c.begin_placement(at(1.0)).unwrap();
        c.on_submit(MarkerForm {
            image: ImageInput::Replace("blob:a".to_string()),
            ..MarkerForm::named("Alice")
        })
        .unwrap();
        c.edit_marker(at(1.0), MarkerForm::named("Alice")).unwrap();
        let stored = c.repository().load("Trip").unwrap();
        assert_eq!(stored.markers[0].image.as_deref(), Some("blob:a"));
    }

    #[test]
    fn test_rename_updates_paths() {
        let mut c = controller();
        place(&mut c, 1.0, "A", "");
        place(&mut c, 2.0, "A", "");
        place(&mut c, 3.0, "B", "");

        c.edit_marker(at(1.0), MarkerForm::named("B")).unwrap();
        let names: Vec<_> = c.visible_paths().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["B"]);
        assert_eq!(c.names(), vec!["A", "B"]);
    }

    #[test]
    fn test_delete_alice_leaves_bob() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "");
        place(&mut c, 2.0, "Alice", "");
        place(&mut c, 3.0, "Bob", "");

        c.delete_marker(at(1.0)).unwrap();
        c.delete_marker(at(2.0)).unwrap();
        assert!(c.visible_paths().is_empty());
        assert_eq!(c.names(), vec!["Bob"]);
        assert!(matches!(c.delete_marker(at(2.0)), Err(Error::MarkerNotFound(_))));

        let stored = c.repository().load("Trip").unwrap();
        assert_eq!(stored.markers.len(), 1);
        assert!(!stored.name_colors.contains_key("Alice"));
    }

    #[test]
    fn test_tag_filter_visibility() {
        let mut c = controller();
        place(&mut c, 1.0, "M1", "work");
        place(&mut c, 2.0, "M2", "home");

        assert!(c.toggle_tag("work").unwrap());
        let visible: Vec<_> = c.visible_markers().iter().map(|m| m.name.clone()).collect();
        assert_eq!(visible, vec!["M1"]);
        assert_eq!(c.surface().markers().len(), 1);

        assert!(!c.toggle_tag("work").unwrap());
        assert_eq!(c.visible_markers().len(), 2);
    }

    #[test]
    fn test_name_filter_requires_known_person() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "");
        assert!(c.set_name_filter(Some("Zed".to_string())).is_err());
        c.set_name_filter(Some("Alice".to_string())).unwrap();
        assert_eq!(c.visible_markers().len(), 1);
    }

    #[test]
    fn test_switch_project_resets_state() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "work");
        c.toggle_tag("work").unwrap();
        c.begin_placement(at(5.0)).unwrap();

        c.create_project("Other").unwrap();
        assert_eq!(c.active_project(), Some("Other"));
        assert_eq!(c.pending_placement(), None);
        assert!(c.all_tags().is_empty());

        c.open_project("Trip").unwrap();
        assert!(c.session().unwrap().filter().tags.selection().is_empty());
        assert_eq!(c.all_tags().into_iter().collect::<Vec<_>>(), vec!["work"]);
    }

    #[test]
    fn test_colors_survive_reopen() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "");
        let red = Color::from_rgb(255, 0, 0);
        c.set_color("Alice", red).unwrap();
        c.create_project("Other").unwrap();
        c.open_project("Trip").unwrap();
        assert_eq!(c.session().unwrap().colors().get("Alice"), Some(red));
    }

    #[test]
    fn test_delete_active_project_closes_session() {
        let mut c = controller();
        assert!(c.delete_project("Trip").unwrap());
        assert_eq!(c.active_project(), None);
        assert!(!c.delete_project("Trip").unwrap());
        assert!(c.projects().unwrap().is_empty());
    }

    #[test]
    fn test_transfer_round_trip_through_controller() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "work, mit");
        place(&mut c, 2.0, "Alice", "");
        let doc = c.export_project().unwrap();
        let before = c.session().unwrap().to_project();

        c.delete_project("Trip").unwrap();
        c.import_project(doc, false).unwrap();
        assert_eq!(c.active_project(), Some("Trip"));
        assert_eq!(c.session().unwrap().to_project(), before);
    }

    #[test]
    fn test_geojson_import_requires_name() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "work");
        let doc = serde_json::to_string(&c.export_geojson().unwrap()).unwrap();
        assert!(matches!(c.import_geojson(&doc, " ", false), Err(Error::Validation(_))));
        assert!(matches!(
            c.import_geojson(&doc, "Trip", false),
            Err(Error::DuplicateProject(_))
        ));

        c.import_geojson(&doc, "Copy", false).unwrap();
        assert_eq!(c.active_project(), Some("Copy"));
        assert!(c.all_tags().is_empty());
    }

    #[test]
    fn test_colors_drawn_on_open_are_saved_and_exported() {
        let mut c = controller();
        let doc = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.0, 1.0]},
             "properties": {"name": "Solo"}}
        ]}"#;
        c.import_geojson(doc, "Copy", false).unwrap();

        let shown = c.session().unwrap().colors().get("Solo");
        assert!(shown.is_some());
        assert_eq!(c.export_project().unwrap().name_colors.get("Solo").copied(), shown);
        assert_eq!(
            c.repository().load("Copy").unwrap().name_colors.get("Solo").copied(),
            shown
        );

        c.open_project("Trip").unwrap();
        c.open_project("Copy").unwrap();
        assert_eq!(c.session().unwrap().colors().get("Solo"), shown);
    }

    #[test]
    fn test_open_fails_cleanly_when_colors_cannot_be_saved() {
        let mut c = controller();
        c.repo
            .save("Old", &[Marker::new(at(1.0), "Alice")], &ColorMap::new())
            .unwrap();
        c.repo.store_mut().fail_writes = true;

        assert!(matches!(c.open_project("Old"), Err(Error::StorageUnavailable(_))));
        assert_eq!(c.active_project(), Some("Trip"));
        assert!(c.repository().load("Old").unwrap().name_colors.is_empty());
    }

    #[test]
    fn test_geojson_export_follows_session_colors() {
        let mut c = controller();
        place(&mut c, 1.0, "Alice", "");
        place(&mut c, 2.0, "Alice", "");
        let red = Color::from_rgb(255, 0, 0);
        c.set_color("Alice", red).unwrap();

        let doc = serde_json::to_value(c.export_geojson().unwrap()).unwrap();
        let line = doc["features"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["geometry"]["type"] == "LineString")
            .unwrap();
        assert_eq!(line["properties"]["color"], red.to_string());
    }
}

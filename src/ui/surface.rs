// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Map widget seam.
//!
//! The core never renders. After each committed action the controller
//! redraws the visible markers and paths through a [`MapSurface`], which
//! the host maps onto its mapping library.

use crate::models::color::Color;
use crate::models::marker::{Marker, Position};
use crate::session::paths::Path;

/// Drawing calls the core makes into the host's map widget.
pub trait MapSurface {
    /// Remove every marker and path previously drawn.
    fn clear(&mut self);

    /// Draw a marker with its person's icon color and info text.
    fn draw_marker(&mut self, marker: &Marker, color: Color, info: &str);

    fn draw_path(&mut self, path: &Path);

    /// Show the not yet submitted marker of an in-progress placement.
    fn show_provisional(&mut self, position: Position);

    fn remove_provisional(&mut self);
}

/// Surface that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl MapSurface for NullSurface {
    fn clear(&mut self) {}
    fn draw_marker(&mut self, _marker: &Marker, _color: Color, _info: &str) {}
    fn draw_path(&mut self, _path: &Path) {}
    fn show_provisional(&mut self, _position: Position) {}
    fn remove_provisional(&mut self) {}
}

/// Surface that keeps a plain-text description of what is drawn.
#[derive(Debug, Clone, Default)]
pub struct TextSurface {
    markers: Vec<String>,
    paths: Vec<String>,
    provisional: Option<Position>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn provisional(&self) -> Option<Position> {
        self.provisional
    }

    /// Everything currently drawn, markers first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.markers
            .iter()
            .chain(self.paths.iter())
            .map(String::as_str)
    }
}

impl MapSurface for TextSurface {
    fn clear(&mut self) {
        self.markers.clear();
        self.paths.clear();
    }

    fn draw_marker(&mut self, marker: &Marker, color: Color, info: &str) {
        let info = info.replace('\n', " | ");
        self.markers
            .push(format!("marker {} {} {}", marker.position, color, info));
    }

    fn draw_path(&mut self, path: &Path) {
        let points: Vec<String> = path.points.iter().map(ToString::to_string).collect();
        self.paths.push(format!(
            "path {} {} [{}]",
            path.name,
            path.color,
            points.join(" -> ")
        ));
    }

    fn show_provisional(&mut self, position: Position) {
        self.provisional = Some(position);
    }

    fn remove_provisional(&mut self) {
        self.provisional = None;
    }
}

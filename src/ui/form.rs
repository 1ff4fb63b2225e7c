// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marker form input.
//!
//! This module turns raw form fields into marker records and patches, and
//! defines the submit/cancel capability a placement form talks to.

use crate::error::{Error, Result};
use crate::models::marker::{Marker, MarkerPatch, Position, PositionKey};

/// Image field of the marker form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageInput {
    /// Keep whatever the marker had (nothing, for a new marker).
    #[default]
    Keep,
    Replace(String),
    Clear,
}

/// Raw values submitted from the marker form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerForm {
    pub name: String,
    pub description: String,
    pub years: String,
    /// Comma-separated, e.g. "work, travel".
    pub tags: String,
    pub image: ImageInput,
}

/// Split comma-separated tag text, trimming and dropping empty entries.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl MarkerForm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn checked_name(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name is required!".to_string()));
        }
        Ok(name.to_string())
    }

    /// Build the record for a newly placed marker.
    pub fn into_marker(self, position: Position) -> Result<Marker> {
        let name = self.checked_name()?;
        let image = match self.image {
            ImageInput::Replace(url) => Some(url),
            ImageInput::Keep | ImageInput::Clear => None,
        };
        let marker = Marker {
            position,
            name,
            description: self.description,
            years: self.years,
            tags: parse_tags(&self.tags),
            image,
        };
        marker.validate()?;
        Ok(marker)
    }

    /// Build the patch for an edit; every text field is replaced.
    pub fn into_patch(self) -> Result<MarkerPatch> {
        let name = self.checked_name()?;
        let image = match self.image {
            ImageInput::Keep => None,
            ImageInput::Replace(url) => Some(Some(url)),
            ImageInput::Clear => Some(None),
        };
        Ok(MarkerPatch {
            name: Some(name),
            description: Some(self.description),
            years: Some(self.years),
            tags: Some(parse_tags(&self.tags)),
            image,
        })
    }
}

/// Callbacks for a marker placement form.
pub trait PlacementHandler {
    /// Commit the pending placement with the submitted values.
    ///
    /// A validation failure leaves the placement pending so the form can be
    /// corrected and resubmitted.
    fn on_submit(&mut self, form: MarkerForm) -> Result<PositionKey>;

    /// Abandon the pending placement.
    fn on_cancel(&mut self);
}

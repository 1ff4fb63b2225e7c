// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marker data structures.
//!
//! This module defines the in-memory marker record, its position identity,
//! and the wire shape markers take inside stored projects and transfer
//! documents.

use crate::error::{Error, Result};
use crate::util::geometry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    /// Create a position without range checks.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The identity key of a marker placed at this position.
    pub fn key(&self) -> PositionKey {
        PositionKey::from(*self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Exact-match identity of a position.
///
/// Two positions share a key only if both coordinates are bit-for-bit equal,
/// with `-0.0` folded onto `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    lat_bits: u64,
    lng_bits: u64,
}

impl From<Position> for PositionKey {
    fn from(position: Position) -> Self {
        // -0.0 + 0.0 == +0.0
        Self {
            lat_bits: (position.lat + 0.0).to_bits(),
            lng_bits: (position.lng + 0.0).to_bits(),
        }
    }
}

impl PositionKey {
    /// Recover the position this key was made from.
    pub fn position(&self) -> Position {
        Position {
            lat: f64::from_bits(self.lat_bits),
            lng: f64::from_bits(self.lng_bits),
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.position().fmt(f)
    }
}

/// A single annotated point on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Position,
    pub name: String,
    pub description: String,
    /// Free-form, e.g. "2020-2023".
    pub years: String,
    /// Order preserved, duplicates allowed.
    pub tags: Vec<String>,
    pub image: Option<String>,
}

impl Marker {
    /// Create a marker with only the required fields set.
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            description: String::new(),
            years: String::new(),
            tags: Vec::new(),
            image: None,
        }
    }

    /// Builder-style tag setter.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn key(&self) -> PositionKey {
        self.position.key()
    }

    /// Check the invariants every stored marker must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Name is required".to_string()));
        }
        geometry::validate_position(self.position)
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: MarkerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(years) = patch.years {
            self.years = years;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
    }

    pub fn has_any_tag<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        tags.into_iter().any(|tag| self.tags.contains(tag))
    }
}

/// Changed fields for an existing marker. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub years: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the image reference.
    pub image: Option<Option<String>>,
}

/// Marker as it appears in stored projects and transfer documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRecord {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Marker> for MarkerRecord {
    fn from(marker: &Marker) -> Self {
        Self {
            lat: marker.position.lat,
            lng: marker.position.lng,
            name: marker.name.clone(),
            description: marker.description.clone(),
            image_url: marker.image.clone(),
            years: marker.years.clone(),
            tags: marker.tags.clone(),
        }
    }
}

impl TryFrom<MarkerRecord> for Marker {
    type Error = Error;

    fn try_from(record: MarkerRecord) -> Result<Self> {
        let marker = Marker {
            position: Position::new(record.lat, record.lng),
            name: record.name,
            description: record.description,
            years: record.years,
            tags: record.tags,
            image: record.image_url,
        };
        marker.validate()?;
        Ok(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_zero_shares_key() {
        assert_eq!(Position::new(0.0, -0.0).key(), Position::new(-0.0, 0.0).key());
        assert_ne!(Position::new(1.0, 2.0).key(), Position::new(2.0, 1.0).key());
    }

    #[test]
    fn test_key_round_trips_position() {
        let position = Position::new(42.3601, -71.0942);
        assert_eq!(position.key().position(), position);
        assert_eq!(position.key().to_string(), "42.3601,-71.0942");
    }

    #[test]
    fn test_apply_patch_only_touches_given_fields() {
        let mut marker = Marker::new(Position::new(1.0, 1.0), "Alice").with_tags(["work"]);
        marker.image = Some("blob:1".to_string());
        marker.apply(MarkerPatch {
            description: Some("office".to_string()),
            ..Default::default()
        });
        assert_eq!(marker.name, "Alice");
        assert_eq!(marker.description, "office");
        assert_eq!(marker.tags, vec!["work"]);
        assert_eq!(marker.image.as_deref(), Some("blob:1"));

        marker.apply(MarkerPatch {
            image: Some(None),
            ..Default::default()
        });
        assert_eq!(marker.image, None);
    }

    #[test]
    fn test_record_defaults_optional_fields() {
        let record: MarkerRecord =
            serde_json::from_str(r#"{"lat": 1.5, "lng": 2.5, "name": "Bob"}"#).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.image_url, None);
        assert!(record.tags.is_empty());

        let marker = Marker::try_from(record).unwrap();
        assert_eq!(marker.position, Position::new(1.5, 2.5));
    }

    #[test]
    fn test_record_without_name_is_rejected() {
        let record = MarkerRecord {
            lat: 0.0,
            lng: 0.0,
            name: "   ".to_string(),
            description: String::new(),
            image_url: None,
            years: String::new(),
            tags: Vec::new(),
        };
        assert!(matches!(Marker::try_from(record), Err(Error::Validation(_))));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let mut marker = Marker::new(Position::new(1.0, 2.0), "Alice");
        marker.image = Some("blob:x".to_string());
        let json = serde_json::to_value(MarkerRecord::from(&marker)).unwrap();
        assert_eq!(json["imageUrl"], "blob:x");
        assert_eq!(json["lat"], 1.0);
    }
}

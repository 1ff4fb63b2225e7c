// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geographic coordinate helpers.
//!
//! This module validates latitude/longitude pairs and converts between
//! positions and the `[lng, lat]` coordinate order GeoJSON uses.

use crate::error::{Error, Result};
use crate::models::marker::Position;

/// Reject non-finite or out of range coordinates.
pub fn validate_position(position: Position) -> Result<()> {
    let Position { lat, lng } = position;
    if !lat.is_finite() || !lng.is_finite() {
        return Err(Error::Validation(format!(
            "Position {position} is not a finite coordinate"
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::Validation(format!(
            "Latitude {lat} is outside [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(Error::Validation(format!(
            "Longitude {lng} is outside [-180, 180]"
        )));
    }
    Ok(())
}

/// Convert a position to GeoJSON `[lng, lat]` order.
pub fn to_lng_lat(position: &Position) -> [f64; 2] {
    [position.lng, position.lat]
}

/// Convert GeoJSON `[lng, lat, ...]` coordinates to a position.
///
/// Any altitude component is ignored. Returns `None` for fewer than two
/// components.
pub fn from_lng_lat(coordinates: &[f64]) -> Option<Position> {
    match coordinates {
        [lng, lat, ..] => Some(Position::new(*lat, *lng)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lng_lat_roundtrip() {
        let position = Position::new(42.3601, -71.0942);
        let coords = to_lng_lat(&position);
        assert_eq!(coords, [-71.0942, 42.3601]);
        assert_eq!(from_lng_lat(&coords), Some(position));
    }

    #[test]
    fn test_from_lng_lat_ignores_altitude() {
        assert_eq!(
            from_lng_lat(&[10.0, 20.0, 300.0]),
            Some(Position::new(20.0, 10.0))
        );
        assert_eq!(from_lng_lat(&[10.0]), None);
    }

    #[test]
    fn test_validate_corners() {
        assert!(validate_position(Position::new(90.0, 180.0)).is_ok());
        assert!(validate_position(Position::new(-90.0, -180.0)).is_ok());
        assert!(validate_position(Position::new(90.5, 0.0)).is_err());
        assert!(validate_position(Position::new(0.0, -180.1)).is_err());
        assert!(validate_position(Position::new(f64::NAN, 0.0)).is_err());
        assert!(validate_position(Position::new(0.0, f64::INFINITY)).is_err());
    }
}

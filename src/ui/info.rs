// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marker info text shown in the map popup.

use crate::models::marker::Marker;

/// Render the info text for a marker. Empty fields are left out.
pub fn marker_info(marker: &Marker) -> String {
    let mut lines = vec![marker.name.clone()];
    if !marker.years.is_empty() {
        lines.push(format!("Year(s): {}", marker.years));
    }
    if !marker.description.is_empty() {
        lines.push(marker.description.clone());
    }
    if !marker.tags.is_empty() {
        lines.push(format!("Tags: {}", marker.tags.join(", ")));
    }
    if let Some(image) = &marker.image {
        lines.push(format!("Image: {image}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::marker::Position;

    #[test]
    fn test_minimal_marker_is_just_the_name() {
        let marker = Marker::new(Position::new(0.0, 0.0), "Alice");
        assert_eq!(marker_info(&marker), "Alice");
    }

    #[test]
    fn test_full_marker() {
        let mut marker = Marker::new(Position::new(0.0, 0.0), "Alice").with_tags(["work", "mit"]);
        marker.years = "2020-2023".to_string();
        marker.description = "Lab".to_string();
        marker.image = Some("blob:7".to_string());
        assert_eq!(
            marker_info(&marker),
            "Alice\nYear(s): 2020-2023\nLab\nTags: work, mit\nImage: blob:7"
        );
    }
}

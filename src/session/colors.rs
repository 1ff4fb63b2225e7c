// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-person color assignment.

use crate::models::color::{Color, ColorMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maps person names to display colors, drawing a random color on first use.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    colors: ColorMap,
    rng: StdRng,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorAssigner {
    /// Assigner backed by an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Assigner with a fixed seed, for reproducible colors.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            colors: ColorMap::new(),
            rng,
        }
    }

    /// Replace all entries, e.g. when restoring a stored or imported project.
    pub fn restore(&mut self, colors: ColorMap) {
        self.colors = colors;
    }

    /// Existing color for `name`, or a new random one that is then recorded.
    pub fn color_for(&mut self, name: &str) -> Color {
        if let Some(color) = self.colors.get(name) {
            return *color;
        }
        let color = self.random_color();
        log::debug!("Assigned {} to '{}'", color, name);
        self.colors.insert(name.to_string(), color);
        color
    }

    /// Six independent uniform hex digits.
    fn random_color(&mut self) -> Color {
        let value = (0..6).fold(0u32, |acc, _| (acc << 4) | self.rng.gen_range(0..16u32));
        Color::from_u24(value)
    }

    /// Explicit user override.
    pub fn set_color(&mut self, name: &str, color: Color) {
        self.colors.insert(name.to_string(), color);
    }

    /// Drop the entry for `name`. Only call once no markers for it remain.
    pub fn release(&mut self, name: &str) -> Option<Color> {
        self.colors.remove(name)
    }

    /// Drop every entry for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.colors.retain(|name, _| keep(name.as_str()));
    }

    pub fn get(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn assignments(&self) -> &ColorMap {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_for_is_stable() {
        let mut colors = ColorAssigner::seeded(7);
        let first = colors.color_for("Alice");
        assert_eq!(colors.color_for("Alice"), first);
        assert_eq!(colors.assignments().len(), 1);
    }

    #[test]
    fn test_seeded_assigners_agree() {
        let mut a = ColorAssigner::seeded(42);
        let mut b = ColorAssigner::seeded(42);
        for name in ["Alice", "Bob", "Carol"] {
            assert_eq!(a.color_for(name), b.color_for(name));
        }
    }

    #[test]
    fn test_release_allows_new_color() {
        let mut colors = ColorAssigner::seeded(1);
        let first = colors.color_for("Alice");
        assert_eq!(colors.release("Alice"), Some(first));
        assert!(!colors.contains("Alice"));

        // The generator has advanced, so the next draw comes from a new state.
        let mut replay = ColorAssigner::seeded(1);
        replay.color_for("Alice");
        let expected_second = replay.color_for("Someone else");
        assert_eq!(colors.color_for("Alice"), expected_second);
    }

    #[test]
    fn test_set_color_overrides() {
        let mut colors = ColorAssigner::seeded(3);
        colors.color_for("Alice");
        let red = Color::from_rgb(255, 0, 0);
        colors.set_color("Alice", red);
        assert_eq!(colors.color_for("Alice"), red);
    }

    #[test]
    fn test_retain_prunes_entries() {
        let mut colors = ColorAssigner::seeded(3);
        colors.color_for("Alice");
        colors.color_for("Bob");
        colors.retain(|name| name == "Bob");
        assert_eq!(colors.names().collect::<Vec<_>>(), vec!["Bob"]);
    }
}

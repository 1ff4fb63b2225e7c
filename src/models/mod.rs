// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for markers, colors, and projects.

pub mod color;
pub mod marker;
pub mod project;

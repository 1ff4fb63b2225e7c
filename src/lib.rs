// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MAPMARKS - map annotation core
//!
//! Keeps named, tagged markers, the per-person paths and colors derived from
//! them, tag and name filters, and persisted projects consistent across
//! every user action. Rendering is left to the host through
//! [`ui::surface::MapSurface`].

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod repository;
pub mod session;
pub mod ui;
pub mod util;

pub use app::Controller;
pub use error::{Error, Result};
pub use models::marker::{Marker, Position};
pub use repository::ProjectRepository;

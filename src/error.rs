// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the map annotation core.

use crate::io::storage::StorageError;
use crate::models::marker::Position;
use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a user action can end in.
///
/// All of these are terminal for the action that raised them: the session
/// and the persisted collection are left exactly as they were.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid user input (blank name, out of range position).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A project with this name already exists.
    #[error("Project already exists: {0}")]
    DuplicateProject(String),

    /// No project with this name is stored.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// A transfer or GeoJSON document is missing required content.
    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),

    /// The persistence collaborator could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// The action needs an active project and none is selected.
    #[error("No project selected")]
    NoActiveProject,

    /// No marker exists at the given position in the active project.
    #[error("No marker at {0}")]
    MarkerNotFound(Position),

    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

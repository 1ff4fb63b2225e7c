// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MAPMARKS - command-line map annotation
//!
//! Manage projects of named, tagged map markers and export them as
//! transfer documents or GeoJSON.

mod cli;

use anyhow::Result;

fn main() -> Result<()> {
    cli::run()
}

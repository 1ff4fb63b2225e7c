// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: persistence backends and export/import formats.

pub mod geojson;
pub mod serialization;
pub mod storage;

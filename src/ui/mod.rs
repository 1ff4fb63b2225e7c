// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Seams towards the host UI: map drawing, marker forms and info text.

pub mod form;
pub mod info;
pub mod surface;

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading street networks from [OpenStreetMap](https://www.openstreetmap.org/) XML files.

mod profile;
mod reader;

pub use profile::{street_name, Profile, BICYCLE_PROFILE, FOOT_PROFILE, MOTORCYCLE_PROFILE};
pub use reader::{load_buffer, load_file, load_io, Error, FileFormat, Network, Options};

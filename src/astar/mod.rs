// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod flat;

pub use error::{AStarError, DEFAULT_STEP_LIMIT};
pub use flat::{find_route, search};

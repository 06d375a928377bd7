// SPDX-License-Identifier: MIT
//
// Bildwerk: core types, error, and configuration shared across all crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{BildwerkError, Result};
pub use types::*;

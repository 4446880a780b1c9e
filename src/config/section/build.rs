//! `[handlers]` and `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [handlers]
//! mode = "known"   # known: recognized on* names only; prefixed: any on<letter>…
//!
//! [build]
//! jobs = 0         # Worker threads (0 = all CPUs)
//! ```

use crate::unit::HandlerMode;
use serde::{Deserialize, Serialize};

/// Event handler attribute matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlersConfig {
    pub mode: HandlerMode,
}

/// Batch settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Worker threads; 0 uses all CPUs.
    pub jobs: usize,
}

//! `[compiler]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [compiler]
//! path = "~/.npm/bin/tsc"       # Compiler executable (default: `tsc` on PATH)
//! target = "es2017"             # --target
//! lib = ["es2016", "dom"]       # --lib
//! args = ["--strict"]           # Extra arguments passed through
//! prelude = ["types/env.d.ts"]  # Ambient declarations appended to every unit
//! ```

use crate::transform::Target;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// TypeScript compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Custom compiler executable; `tsc` on `PATH` when unset.
    pub path: Option<PathBuf>,

    pub target: Target,

    pub lib: Vec<String>,

    /// Arguments appended to every invocation.
    pub args: Vec<String>,

    /// Declaration files (relative to the config file) appended after the
    /// main region of every unit.
    pub prelude: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            path: None,
            target: Target::default(),
            lib: vec!["es2016".into(), "dom".into()],
            args: Vec::new(),
            prelude: Vec::new(),
        }
    }
}

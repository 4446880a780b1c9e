//! External transformation of synthetic units.

mod exec;
mod tsc;

pub use tsc::{LazyTsc, Target};

use crate::error::WeaveError;
use std::path::Path;

/// Turns a unit file into compiled text.
///
/// Implementations must be shareable across worker threads: one instance
/// serves every document of a batch.
pub trait Transformer: Sync {
    /// Compile the file at `unit` and return the emitted JavaScript.
    ///
    /// The emitted file is expected next to the unit, with a `.js`
    /// extension; callers own its removal.
    fn transform(&self, unit: &Path) -> Result<String, WeaveError>;
}

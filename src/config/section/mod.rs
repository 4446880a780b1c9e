//! Configuration section definitions.
//!
//! Each module corresponds to a section in `tshtml.toml`:
//!
//! | Module     | TOML Section              | Purpose                          |
//! |------------|---------------------------|----------------------------------|
//! | `compiler` | `[compiler]`              | tsc location, target, lib, args  |
//! | `output`   | `[output]`                | Output naming and post-processing|
//! | `build`    | `[handlers]`, `[build]`   | Handler matching, worker count   |

mod build;
mod compiler;
mod output;

pub use build::{BuildConfig, HandlersConfig};
pub use compiler::CompilerConfig;
pub use output::OutputConfig;

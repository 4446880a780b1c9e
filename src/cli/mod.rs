//! Command-line interface module.

mod args;
pub mod build;
pub mod inputs;

pub use args::Cli;

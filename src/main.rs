//! tshtml - compile inline TypeScript in HTML documents.

mod annotation;
mod cli;
mod config;
mod document;
mod error;
mod logger;
mod pipeline;
mod postprocess;
mod reassemble;
mod transform;
mod unit;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, build::compile_all, inputs::collect_inputs};
use config::CompileConfig;
use transform::LazyTsc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = CompileConfig::load(&cli)?;
    let inputs = collect_inputs(&cli.paths);

    if inputs.is_empty() {
        log!("warning"; "no input files");
        return Ok(());
    }

    // Located on first use, so documents without inline code still compile
    // when it is missing.
    let tsc = LazyTsc::new(&config.compiler);
    let failed = compile_all(&config, &tsc, &inputs)?;

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

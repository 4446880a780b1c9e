//! Batch compilation.
//!
//! Every input is compiled on its own rayon task. A failing file is
//! reported and counted; the rest of the batch carries on.

use super::inputs::Input;
use crate::config::CompileConfig;
use crate::error::WeaveError;
use crate::logger::{ProgressLine, report_error};
use crate::pipeline::{Compiler, InputKind, Outcome};
use crate::transform::Transformer;
use crate::utils::plural::plural_count;
use crate::{debug, log};
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Compile `inputs` and return how many failed.
///
/// A document with unresolved fragments counts as failed even though its
/// output was written.
pub fn compile_all(
    config: &CompileConfig,
    transformer: &dyn Transformer,
    inputs: &[Input],
) -> Result<usize> {
    check_outputs(config, inputs)?;
    let compiler = Compiler::new(config, transformer)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.build.jobs)
        .build()
        .context("Failed to create worker pool")?;
    debug!("build"; "{} worker(s)", pool.current_num_threads());

    let progress = ProgressLine::new(&[
        (InputKind::Document.label(), count(inputs, InputKind::Document)),
        (InputKind::TypeScript.label(), count(inputs, InputKind::TypeScript)),
    ]);
    let failed = AtomicUsize::new(0);

    pool.install(|| {
        inputs.par_iter().for_each(|input| {
            let result = compiler.compile_file(&input.path, input.kind);
            progress.inc(input.kind.label());
            if let Err(e) = check(result) {
                failed.fetch_add(1, Ordering::Relaxed);
                report_error(&input.path.display().to_string(), &e);
            }
        });
    });
    progress.finish();

    let failed = failed.into_inner();
    log!(
        "done";
        "compiled {}, {} failed",
        plural_count(inputs.len() - failed, "file"),
        failed
    );
    Ok(failed)
}

/// Refuse a batch in which two documents would write the same output, as
/// they do when the name pattern lacks `{stem}`.
fn check_outputs(config: &CompileConfig, inputs: &[Input]) -> Result<()> {
    let mut seen: FxHashMap<PathBuf, &Path> = FxHashMap::default();
    for input in inputs.iter().filter(|i| i.kind == InputKind::Document) {
        let output = config.output.output_path(&input.path);
        if let Some(other) = seen.insert(output.clone(), &input.path) {
            bail!(
                "`{}` and `{}` would both be written to `{}`; use `{{stem}}` in the output name",
                other.display(),
                input.path.display(),
                output.display()
            );
        }
    }
    Ok(())
}

fn count(inputs: &[Input], kind: InputKind) -> usize {
    inputs.iter().filter(|i| i.kind == kind).count()
}

/// Turn partial reassembly into an error for reporting.
fn check(result: Result<Outcome, WeaveError>) -> Result<Outcome> {
    let outcome = result?;
    if outcome.is_complete() {
        return Ok(outcome);
    }
    let details: Vec<String> = outcome.unresolved.iter().map(ToString::to_string).collect();
    Err(anyhow!(details.join("\n")).context(format!(
        "{} not written back to {}",
        plural_count(outcome.unresolved.len(), "fragment"),
        outcome.output.display()
    )))
}

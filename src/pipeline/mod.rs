//! Per-document compilation pipeline.
//!
//! ```text
//! source ──parse──► HtmlDocument ──decompose──► Decomposition
//!                                                    │ assemble
//!                                                    ▼
//! html ◄──post-process── reassemble ◄──transform── unit (.ts)
//! ```
//!
//! - [`prepare`] and [`finish`] are pure: text in, text out.
//! - [`Compiler`] adds the filesystem around them (temp units, output files)
//!   and is shared by every worker of a batch.

mod document;

pub use document::{InputKind, Outcome, TempUnit};

use crate::config::CompileConfig;
use crate::{debug, log};
use crate::document::HtmlDocument;
use crate::error::WeaveError;
use crate::postprocess::PostProcess;
use crate::reassemble::{Reassembly, reassemble};
use crate::transform::Transformer;
use crate::unit::{BoundaryTokens, Decomposition, HandlerMode, Region, assemble, decompose};
use anyhow::Result;
use std::path::Path;

// =============================================================================
// Types
// =============================================================================

/// A parsed document with its unit, ready for the transformer.
#[derive(Debug)]
pub struct Prepared {
    pub doc: HtmlDocument,
    pub tokens: BoundaryTokens,
    pub decomposition: Decomposition,
    /// Unit text; empty when nothing needs compiling.
    pub unit: String,
}

impl Prepared {
    /// Whether the transformer has to run at all.
    pub fn needs_transform(&self) -> bool {
        self.decomposition.has_fragments()
    }
}

/// Final document text and what reassembly found.
#[derive(Debug)]
pub struct Compiled {
    pub html: String,
    pub report: Reassembly,
}

// =============================================================================
// Pure stages
// =============================================================================

/// Parse `source`, decompose it and lay out its unit.
pub fn prepare(source: &str, mode: HandlerMode, prelude: &str) -> Result<Prepared, WeaveError> {
    let doc = HtmlDocument::parse(source)?;
    let decomposition = decompose(&doc, mode);
    let tokens = BoundaryTokens::new();

    let unit = if decomposition.has_fragments() {
        assemble(&decomposition, &tokens, prelude)?
    } else {
        String::new()
    };

    Ok(Prepared {
        doc,
        tokens,
        decomposition,
        unit,
    })
}

/// Weave transformer `output` back into the prepared document and
/// post-process the result.
///
/// `output` is ignored when [`Prepared::needs_transform`] is false.
pub fn finish(
    prepared: Prepared,
    output: &str,
    post: &PostProcess,
) -> Result<Compiled, WeaveError> {
    let Prepared {
        mut doc,
        tokens,
        decomposition,
        ..
    } = prepared;

    let report = if decomposition.has_fragments() {
        reassemble(output, &tokens, &mut doc)?
    } else {
        Reassembly::default()
    };

    for (region, found) in [
        (Region::Handlers, report.handlers),
        (Region::Main, report.scripts),
    ] {
        let expected = decomposition.fragment_count(region);
        if found != expected {
            log!(
                "warning";
                "{} of {} {} fragment(s) found in transformer output",
                found, expected, region
            );
        }
    }

    let html = post.apply(&doc.to_html());
    Ok(Compiled { html, report })
}

// =============================================================================
// Compiler
// =============================================================================

/// Everything a worker needs to compile documents.
pub struct Compiler<'a> {
    config: &'a CompileConfig,
    transformer: &'a dyn Transformer,
    prelude: String,
    post: PostProcess,
}

impl<'a> Compiler<'a> {
    /// Build a compiler, reading the configured prelude files once.
    pub fn new(config: &'a CompileConfig, transformer: &'a dyn Transformer) -> Result<Self> {
        Ok(Self {
            config,
            transformer,
            prelude: config.load_prelude()?,
            post: PostProcess::from_config(config),
        })
    }

    pub fn config(&self) -> &CompileConfig {
        self.config
    }

    /// Compile document text. `unit_path` is where the unit is written for
    /// the transformer.
    pub fn compile_source(&self, source: &str, unit_path: &Path) -> Result<Compiled, WeaveError> {
        let prepared = prepare(source, self.config.handlers.mode, &self.prelude)?;

        if !prepared.needs_transform() {
            debug!("pipeline"; "no fragments, skipping transformer");
            return finish(prepared, "", &self.post);
        }

        let unit = TempUnit::write(unit_path, &prepared.unit, self.config.output.keep_temp)?;
        let output = self.transformer.transform(unit.path())?;
        finish(prepared, &output, &self.post)
    }
}

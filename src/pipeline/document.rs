//! File-level compilation: temp units, input kinds and output files.

use super::Compiler;
use crate::error::WeaveError;
use crate::debug;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extension of host documents.
const DOCUMENT_EXT: &str = "tshtml";

/// What an input file is compiled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Host document with inline code.
    Document,
    /// Plain TypeScript, handed to the transformer as is.
    TypeScript,
}

impl InputKind {
    /// Classify by extension. Declaration files and unknown extensions
    /// yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".d.ts") {
            return None;
        }
        match path.extension()?.to_str()? {
            DOCUMENT_EXT => Some(Self::Document),
            "ts" => Some(Self::TypeScript),
            _ => None,
        }
    }

    /// Progress counter name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Document => "tshtml",
            Self::TypeScript => "ts",
        }
    }
}

/// Result of compiling one input file.
#[derive(Debug)]
pub struct Outcome {
    pub output: PathBuf,
    /// Fragments that could not be written back; the output was still
    /// written without them.
    pub unresolved: Vec<WeaveError>,
}

impl Outcome {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// A unit file on disk, removed with its emitted `.js` on drop.
#[derive(Debug)]
pub struct TempUnit {
    path: PathBuf,
    keep: bool,
}

impl TempUnit {
    pub fn write(path: &Path, text: &str, keep: bool) -> Result<Self, WeaveError> {
        fs::write(path, text).map_err(|e| WeaveError::io("write", path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unit location for `input`: a hidden `.<stem>.<uuid>.ts` in the same
    /// directory, so relative imports resolve as they do from the document.
    pub fn path_for(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        input.with_file_name(format!(".{stem}.{}.ts", Uuid::new_v4().simple()))
    }
}

impl Drop for TempUnit {
    fn drop(&mut self) {
        if self.keep {
            debug!("unit"; "kept {}", self.path.display());
            return;
        }
        for path in [self.path.clone(), self.path.with_extension("js")] {
            if path.exists() {
                fs::remove_file(&path).ok();
            }
        }
    }
}

impl Compiler<'_> {
    /// Compile one input file according to its kind.
    pub fn compile_file(&self, input: &Path, kind: InputKind) -> Result<Outcome, WeaveError> {
        match kind {
            InputKind::Document => self.compile_document(input),
            InputKind::TypeScript => self.compile_typescript(input),
        }
    }

    fn compile_document(&self, input: &Path) -> Result<Outcome, WeaveError> {
        let output = self.config().output.output_path(input);
        if output == input {
            return Err(WeaveError::OutputIsInput { path: output });
        }

        let source = fs::read_to_string(input).map_err(|e| WeaveError::io("read", input, e))?;
        let compiled = self.compile_source(&source, &TempUnit::path_for(input))?;

        fs::write(&output, &compiled.html).map_err(|e| WeaveError::io("write", &output, e))?;
        debug!("compile"; "{} -> {}", input.display(), output.display());

        Ok(Outcome {
            output,
            unresolved: compiled.report.unresolved,
        })
    }

    fn compile_typescript(&self, input: &Path) -> Result<Outcome, WeaveError> {
        self.transformer.transform(input)?;
        let output = input.with_extension("js");
        debug!("compile"; "{} -> {}", input.display(), output.display());
        Ok(Outcome {
            output,
            unresolved: Vec::new(),
        })
    }
}

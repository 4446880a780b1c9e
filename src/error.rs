//! Document compilation errors.

use crate::annotation::{AnnotationError, CorrelationId};
use crate::document::{DocumentError, Locator};
use crate::unit::Region;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeaveError {
    /// A boundary marker is missing from the transformer output.
    #[error("{region} region not found in transformer output")]
    RegionNotFound { region: Region },

    /// An annotation's locator no longer resolves.
    #[error("no element at {locator} for fragment {id}")]
    NodeNotFound {
        locator: Locator,
        id: CorrelationId,
    },

    #[error("TypeScript compiler `{tool}` not found")]
    ToolNotFound { tool: String },

    #[error("TypeScript compiler reported errors:\n{diagnostics}")]
    TransformFailed { diagnostics: String },

    #[error("output `{}` would overwrite its input", path.display())]
    OutputIsInput { path: PathBuf },

    #[error("failed to {action} `{}`", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

impl WeaveError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

//! Fragment annotations and their comment-token codec.
//!
//! Every fragment written into the synthetic unit is followed by a token
//!
//! ```text
//! /*{"id":"8c0e…","kind":"handler","locator":"/html[1]/body[1]/button[1]","attribute":"onclick","accessor":"document.getElementById('__tshtml_1f2e3d4c')"}*/
//! ```
//!
//! that survives compilation as an ordinary comment and tells reassembly
//! where the preceding body belongs. A token is only an annotation when it
//! decodes completely for the expected kind; anything else is body text.

use crate::document::Locator;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

const TOKEN_OPEN: &str = "/*{";
const TOKEN_CLOSE: &str = "}*/";

/// Annotation encoding errors.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("failed to encode annotation {id}")]
    Encode {
        id: CorrelationId,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-unique fragment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Which region an annotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Handler,
    Script,
}

impl KindTag {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Handler => "handler",
            Self::Script => "script",
        }
    }
}

/// Kind-specific annotation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Event handler attribute body.
    Handler {
        /// Attribute name, e.g. `onclick`.
        attribute: String,
        /// Expression standing in for `this` inside the unit.
        accessor: String,
    },
    /// `<script>` container body.
    Script,
}

/// Metadata tying a fragment to its origin node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub id: CorrelationId,
    pub locator: Locator,
    pub kind: AnnotationKind,
}

/// Wire form. Every field is optional so that a structurally incomplete
/// record decodes and is then rejected, rather than failing to parse.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accessor: Option<String>,
}

impl Annotation {
    pub fn handler(locator: Locator, attribute: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            id: CorrelationId::new(),
            locator,
            kind: AnnotationKind::Handler {
                attribute: attribute.into(),
                accessor: accessor.into(),
            },
        }
    }

    pub fn script(locator: Locator) -> Self {
        Self {
            id: CorrelationId::new(),
            locator,
            kind: AnnotationKind::Script,
        }
    }

    pub fn tag(&self) -> KindTag {
        match self.kind {
            AnnotationKind::Handler { .. } => KindTag::Handler,
            AnnotationKind::Script => KindTag::Script,
        }
    }

    /// Encode as a comment token.
    ///
    /// `*/` inside the JSON is written as `*\/` (a valid JSON escape), so the
    /// token always ends at its own delimiter.
    pub fn encode(&self) -> Result<String, AnnotationError> {
        let mut record = Record {
            id: Some(self.id.to_string()),
            kind: Some(self.tag().as_str().to_string()),
            locator: Some(self.locator.as_str().to_string()),
            ..Record::default()
        };
        if let AnnotationKind::Handler {
            attribute,
            accessor,
        } = &self.kind
        {
            record.attribute = Some(attribute.clone());
            record.accessor = Some(accessor.clone());
        }

        let json = serde_json::to_string(&record).map_err(|source| AnnotationError::Encode {
            id: self.id,
            source,
        })?;
        Ok(format!("/*{}*/", json.replace("*/", "*\\/")))
    }

    /// Decode a token of the expected kind.
    ///
    /// Returns `None` for anything that is not a complete token of that kind:
    /// wrong delimiters, malformed JSON, another kind, a bad id or locator, or
    /// a missing field.
    pub fn try_decode(token: &str, expected: KindTag) -> Option<Self> {
        let token = token.trim();
        if !token.starts_with(TOKEN_OPEN) || !token.ends_with(TOKEN_CLOSE) || token.len() < 6 {
            return None;
        }

        let json = &token[2..token.len() - 2];
        let record: Record = serde_json::from_str(json).ok()?;

        if record.kind.as_deref()? != expected.as_str() {
            return None;
        }
        let id = Uuid::try_parse(record.id.as_deref()?).ok()?;
        let locator = Locator::parse(record.locator.as_deref()?)?;

        let kind = match expected {
            KindTag::Handler => AnnotationKind::Handler {
                attribute: record.attribute.filter(|s| !s.is_empty())?,
                accessor: record.accessor.filter(|s| !s.is_empty())?,
            },
            KindTag::Script => AnnotationKind::Script,
        };

        Some(Self {
            id: CorrelationId(id),
            locator,
            kind,
        })
    }

    /// Find a token of the expected kind at the end of `line`.
    ///
    /// Returns the text before the token (body text sharing the line) and
    /// the annotation.
    pub fn find_in_line(line: &str, expected: KindTag) -> Option<(&str, Self)> {
        let trimmed = line.trim_end();
        if !trimmed.ends_with(TOKEN_CLOSE) {
            return None;
        }

        // The token's own JSON can only contain `/*{` inside a string, so try
        // every candidate start from the left until one decodes.
        trimmed
            .match_indices(TOKEN_OPEN)
            .find_map(|(start, _)| {
                Self::try_decode(&trimmed[start..], expected).map(|a| (&line[..start], a))
            })
    }
}

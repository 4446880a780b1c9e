//! `<script type="importmap">` expansion.
//!
//! An import map `{"imports": {"sq": "./sq.js"}}`, or its flat form
//! `{"sq": "./sq.js"}`, becomes `import { sq } from "./sq.js";` so the names
//! it maps are visible to the type checker.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportMapError {
    #[error("import map is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("import map must be a JSON object")]
    NotAnObject,

    #[error("`imports` must be an object of strings")]
    InvalidImports,
}

/// Ordered `name -> path` entries of an import map.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportMap {
    pub imports: Vec<(String, String)>,
}

impl ImportMap {
    /// Parse an import map. The `imports` key is matched case-insensitively.
    /// Without one, an object of string values is the map itself; any other
    /// object has no entries.
    pub fn parse(text: &str) -> Result<Self, ImportMapError> {
        let root: Map<String, Value> = match serde_json::from_str(text)? {
            Value::Object(map) => map,
            _ => return Err(ImportMapError::NotAnObject),
        };

        let imports = root
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("imports"))
            .map(|(_, value)| value);

        match imports {
            Some(Value::Object(entries)) => Ok(Self {
                imports: entries_of(entries).ok_or(ImportMapError::InvalidImports)?,
            }),
            Some(_) => Err(ImportMapError::InvalidImports),
            None => Ok(Self {
                imports: entries_of(&root).unwrap_or_default(),
            }),
        }
    }

    /// One import statement per entry, in map order.
    pub fn to_imports(&self) -> String {
        self.imports
            .iter()
            .map(|(name, path)| format!("import {{ {name} }} from {};\n", quote(path)))
            .collect()
    }
}

/// `name -> path` pairs, or `None` if a value is not a string.
fn entries_of(map: &Map<String, Value>) -> Option<Vec<(String, String)>> {
    map.iter()
        .map(|(name, path)| path.as_str().map(|path| (name.clone(), path.to_string())))
        .collect()
}

/// Double-quoted JS string literal.
pub fn quote(text: &str) -> String {
    // JSON string syntax is a subset of JS string syntax.
    Value::String(text.to_string()).to_string()
}

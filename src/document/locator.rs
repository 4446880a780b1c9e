//! Element locators.
//!
//! A locator is an element path in the XPath subset
//! `/html[1]/body[1]/button[2]`: each step is a lowercase tag name and its
//! 1-based position among same-named siblings.
//!
//! A name is any non-empty run of characters other than `/` and whitespace,
//! so custom elements (`x-a_b`, `x-foo.bar`) and namespaced names
//! (`svg:rect`) round-trip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable reference to an element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Path of the document root (no steps).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Append a step for the `position`-th `name` child.
    pub fn child(&self, name: &str, position: usize) -> Self {
        Self(format!("{}/{name}[{position}]", self.0))
    }

    /// Parse a locator, accepting only well-formed paths.
    pub fn parse(text: &str) -> Option<Self> {
        let steps = text.strip_prefix('/')?;
        let valid = steps.split('/').all(|step| {
            let Some((name, rest)) = step.rsplit_once('[') else {
                return false;
            };
            let Some(index) = rest.strip_suffix(']') else {
                return false;
            };
            is_step_name(name)
                && index.bytes().all(|b| b.is_ascii_digit())
                && index.parse::<usize>().is_ok_and(|n| n > 0)
        });
        valid.then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `name` can appear as a step. Every element name the document
/// index assigns a locator to satisfies this.
pub(crate) fn is_step_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c == '/' || c.is_whitespace())
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

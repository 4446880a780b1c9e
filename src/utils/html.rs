//! HTML utility functions.
//!
//! Provides common HTML processing functions:
//! - `escape_attr()` - entity escaping for a quoted attribute value
//! - `unescape()` - decode entities in attribute values
//! - `is_void_element()` - Self-closing elements (br, img, etc.)
//! - `is_raw_text_element()` - Raw text elements (script, style)
//! - `is_preformatted_element()` - Elements whose whitespace is significant
//! - `ScriptType::of()` - What a `<script type>` value makes of the content

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Get the HTML entity for a character that must be escaped inside a
/// value quoted with `quote`.
#[inline]
fn escape_char(c: char, quote: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '"' if quote == '"' => Some("&quot;"),
        '\'' if quote == '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape an attribute value that will be wrapped in `quote`.
///
/// Only `&` and the enclosing quote are escaped, so handler code keeps
/// its `<`, `>` and the other quote character readable.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_attr(r#"say("hi")"#, '"'), "say(&quot;hi&quot;)");
/// assert_eq!(escape_attr("a < b", '"'), "a < b"); // No allocation
/// ```
pub fn escape_attr(s: &str, quote: char) -> Cow<'_, str> {
    if !s.chars().any(|c| escape_char(c, quote).is_some()) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c, quote) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];

        // Entity body is at most 10 chars and terminated by ';'
        let entity = rest[1..]
            .char_indices()
            .take(11)
            .find(|(_, c)| *c == ';')
            .map(|(end, _)| &rest[1..1 + end]);

        match entity.and_then(decode_entity) {
            Some(c) => {
                result.push(c);
                // '&' + entity + ';'
                rest = &rest[entity.map_or(0, str::len) + 2..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    Cow::Owned(result)
}

/// Decode a single entity name (without `&` and `;`).
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse().ok().and_then(char::from_u32),
        _ => None,
    }
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element (self-closing).
///
/// Void elements cannot have children or inner content.
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content is not markup).
///
/// Script and style content is "raw text": no markup inside.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if whitespace inside the element is significant.
#[inline]
pub fn is_preformatted_element(tag: &str) -> bool {
    matches!(tag, "pre" | "textarea")
}

/// What a script element's content is, judged by its `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    Classic,
    Module,
    ImportMap,
    /// Anything else (`application/ld+json`, `text/template`, ...): the
    /// browser does not run it.
    Data,
}

impl ScriptType {
    /// Classify a `type` attribute value; `None` means the attribute is
    /// missing.
    pub fn of(ty: Option<&str>) -> Self {
        let ty = ty.unwrap_or_default().trim().to_ascii_lowercase();
        match ty.as_str() {
            "" | "text/javascript" | "application/javascript" | "text/ecmascript"
            | "application/ecmascript" => Self::Classic,
            "module" => Self::Module,
            "importmap" => Self::ImportMap,
            _ => Self::Data,
        }
    }

    /// Whether the content is JavaScript.
    pub const fn is_code(self) -> bool {
        matches!(self, Self::Classic | Self::Module)
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Output post-processing: comment removal and minification.
//!
//! Runs over the serialized document as a flat tag/text scan. Raw text
//! element bodies are handed to the script and style minifiers; markup text
//! is collapsed outside `<pre>` and `<textarea>`.

mod minify;

pub use minify::{minify_css, minify_js};

use crate::config::CompileConfig;
use crate::document::escape_close_tag;
use crate::document::scan::{
    find_close_tag, raw_text_tag_at, scan_attributes, start_tag_close,
};
use crate::unit::HandlerMode;
use crate::utils::html::{ScriptType, escape_attr, is_preformatted_element, unescape};
use std::borrow::Cow;
use crate::utils::js::strip_comments;

/// Post-processing switches. `minify` implies comment removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostProcess {
    pub remove_comments: bool,
    pub minify: bool,
    /// Attributes whose values are script, stripped along with `<script>`.
    pub handlers: HandlerMode,
}

impl PostProcess {
    pub fn from_config(config: &CompileConfig) -> Self {
        Self {
            remove_comments: config.output.remove_comments,
            minify: config.output.minify,
            handlers: config.handlers.mode,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.remove_comments && !self.minify
    }

    fn strips_comments(&self) -> bool {
        self.remove_comments || self.minify
    }

    /// Apply to a serialized document.
    pub fn apply(&self, html: &str) -> String {
        if self.is_noop() {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        let mut pos = 0;
        let mut preformatted = 0usize;

        while pos < html.len() {
            let Some(found) = html[pos..].find('<') else {
                self.text(&mut out, &html[pos..], preformatted > 0);
                break;
            };
            let lt = pos + found;
            self.text(&mut out, &html[pos..lt], preformatted > 0);
            let rest = &html[lt..];

            if rest.starts_with("<!--") {
                let end = rest[4..].find("-->").map_or(html.len(), |p| lt + 4 + p + 3);
                if !self.strips_comments() {
                    out.push_str(&html[lt..end]);
                }
                pos = end;
                continue;
            }

            // Declarations and end tags are copied as they are.
            if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</") {
                let end = rest.find('>').map_or(html.len(), |p| lt + p + 1);
                if let Some(name) = rest.strip_prefix("</").map(tag_name)
                    && is_preformatted_element(&name)
                {
                    preformatted = preformatted.saturating_sub(1);
                }
                out.push_str(&html[lt..end]);
                pos = end;
                continue;
            }

            let name = tag_name(&rest[1..]);
            if name.is_empty() {
                out.push('<');
                pos = lt + 1;
                continue;
            }
            let Some(close) = start_tag_close(html, lt) else {
                out.push_str(rest);
                break;
            };
            let tag = self.handler_comments(&html[lt..=close], &name);
            let tag: &str = &tag;
            if self.minify {
                out.push_str(&collapse_tag(tag));
            } else {
                out.push_str(tag);
            }
            pos = close + 1;

            if tag.ends_with("/>") {
                continue;
            }
            if let Some(raw) = raw_text_tag_at(rest) {
                let end = find_close_tag(html, pos, raw).unwrap_or(html.len());
                let content = &html[pos..end];
                match raw {
                    "script" => out.push_str(&self.script(tag, raw, content)),
                    _ => out.push_str(&self.style(content)),
                }
                pos = end;
            } else if is_preformatted_element(&name) {
                preformatted += 1;
            }
        }

        out
    }

    fn text(&self, out: &mut String, text: &str, preformatted: bool) {
        if !self.minify || preformatted {
            out.push_str(text);
            return;
        }
        if text.bytes().all(|b| b.is_ascii_whitespace()) {
            return;
        }
        let mut in_space = false;
        for c in text.chars() {
            if c.is_ascii_whitespace() {
                if !in_space {
                    out.push(' ');
                }
                in_space = true;
            } else {
                out.push(c);
                in_space = false;
            }
        }
    }

    fn script(&self, tag: &str, name: &str, content: &str) -> String {
        let ty = script_type(tag, name);
        if !ty.is_code() {
            return content.to_string();
        }
        let module = ty == ScriptType::Module;
        let stripped = strip_comments(content, module);
        if !self.minify {
            return stripped;
        }
        if stripped.trim().is_empty() {
            return String::new();
        }
        let minified = minify_js(&stripped, module).unwrap_or(stripped);
        escape_close_tag(minified.trim_end(), "script")
    }

    /// Strip comments from the handler attribute values of a start tag.
    fn handler_comments<'t>(&self, tag: &'t str, name: &str) -> Cow<'t, str> {
        if !self.strips_comments() {
            return Cow::Borrowed(tag);
        }
        let end = if tag.ends_with("/>") {
            tag.len() - 2
        } else {
            tag.len() - 1
        };

        let mut out = String::new();
        let mut last = 0;
        for attr in scan_attributes(tag, 1 + name.len(), end) {
            let Some(value) = attr.value else {
                continue;
            };
            if !self
                .handlers
                .matches(&tag[attr.name.clone()].to_ascii_lowercase())
            {
                continue;
            }
            let body = unescape(&tag[value.inner.clone()]);
            let stripped = strip_comments(&body, false);
            if stripped == body {
                continue;
            }
            let stripped = stripped.trim_end();
            out.push_str(&tag[last..value.inner.start]);
            match value.quote {
                Some(quote) => out.push_str(&escape_attr(stripped, quote)),
                None => {
                    out.push('"');
                    out.push_str(&escape_attr(stripped, '"'));
                    out.push('"');
                }
            }
            last = value.inner.end;
        }

        if last == 0 {
            return Cow::Borrowed(tag);
        }
        out.push_str(&tag[last..]);
        Cow::Owned(out)
    }

    fn style(&self, content: &str) -> String {
        if !self.minify || content.trim().is_empty() {
            return content.to_string();
        }
        match minify_css(content) {
            Some(css) => escape_close_tag(&css, "style"),
            None => content.to_string(),
        }
    }
}

/// Lowercased tag name at the start of `text`.
fn tag_name(text: &str) -> String {
    text.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':'))
        .map(|b| b.to_ascii_lowercase() as char)
        .collect()
}

/// Classify a script start tag by its `type` attribute.
fn script_type(tag: &str, name: &str) -> ScriptType {
    let ty = attribute_value(tag, name, "type");
    ScriptType::of(ty.as_deref())
}

/// Decoded value of attribute `attr` in the start tag `tag`; `Some("")` when
/// it has no value.
fn attribute_value(tag: &str, name: &str, attr: &str) -> Option<String> {
    let end = tag.len() - 1;
    scan_attributes(tag, 1 + name.len(), end)
        .into_iter()
        .find(|a| tag[a.name.clone()].eq_ignore_ascii_case(attr))
        .map(|a| {
            a.value
                .map(|v| unescape(&tag[v.inner]).into_owned())
                .unwrap_or_default()
        })
}

/// Collapse whitespace in a start tag outside quoted values.
fn collapse_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote = None;
    let mut pending_space = false;

    for c in tag.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if std::mem::take(&mut pending_space) && !matches!(c, '>' | '=') && !out.ends_with('=') {
            out.push(' ');
        }
        if matches!(c, '"' | '\'') && out.ends_with('=') {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

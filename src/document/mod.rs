//! Host document tree.
//!
//! Parses HTML with `tl` into an immutable element index (document order,
//! tag names, locators, attribute and content spans). Reads always see the
//! parsed source. Writes are recorded as span patches and applied by
//! [`HtmlDocument::to_html`], so:
//!
//! - bytes outside edited spans are reproduced exactly;
//! - an edit never moves or invalidates another element's locator.
//!
//! # Example
//!
//! ```ignore
//! let mut doc = HtmlDocument::parse(r#"<button onclick="go()">x</button>"#)?;
//! let button = doc.resolve(&Locator::parse("/button[1]").unwrap()).unwrap();
//! doc.set_attribute(button, "onclick", "run()")?;
//! assert_eq!(doc.to_html(), r#"<button onclick="run()">x</button>"#);
//! ```

mod locator;
pub(crate) mod scan;

pub use locator::Locator;

use locator::is_step_name;

use crate::debug;
use crate::utils::html::{escape_attr, is_raw_text_element, is_void_element, unescape};
use rustc_hash::FxHashMap;
use scan::{
    AttrSpan, find_close_tag, mask_raw_text, scan_attributes, start_tag_close, tag_name_at,
};
use std::borrow::Cow;
use std::ops::Range;
use thiserror::Error;

/// Document tree errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("element `{0}` has no inner content to replace")]
    NoInnerContent(Locator),

    #[error("invalid attribute name `{0}`")]
    InvalidAttributeName(String),
}

/// Handle to an element of an [`HtmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Attribute {
    /// Lowercased name.
    name: String,
    span: AttrSpan,
}

#[derive(Debug)]
struct Element {
    name: String,
    locator: Locator,
    /// Index of the `>` ending the start tag.
    tag_close: usize,
    self_closing: bool,
    attrs: Vec<Attribute>,
    inner: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EditKey {
    Attribute(NodeId, String),
    Inner(NodeId),
}

#[derive(Debug)]
struct Patch {
    range: Range<usize>,
    text: String,
    /// Insertion order, to keep zero-width inserts at one offset stable.
    seq: usize,
}

/// Parsed host document with deferred edits.
#[derive(Debug)]
pub struct HtmlDocument {
    source: String,
    elements: Vec<Element>,
    by_locator: FxHashMap<Locator, NodeId>,
    edits: FxHashMap<EditKey, Patch>,
    next_seq: usize,
}

impl HtmlDocument {
    /// Parse a document.
    pub fn parse(source: impl Into<String>) -> Result<Self, DocumentError> {
        let source = source.into();
        let elements = index_elements(&source)?;
        let by_locator = elements
            .iter()
            .enumerate()
            .map(|(i, el)| (el.locator.clone(), NodeId(i)))
            .collect();

        Ok(Self {
            source,
            elements,
            by_locator,
            edits: FxHashMap::default(),
            next_seq: 0,
        })
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.elements.len()).map(NodeId)
    }

    /// Resolve a locator to its element.
    pub fn resolve(&self, locator: &Locator) -> Option<NodeId> {
        self.by_locator.get(locator).copied()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.el(id).name
    }

    pub fn locator(&self, id: NodeId) -> &Locator {
        &self.el(id).locator
    }

    /// Attribute names in source order (lowercased).
    pub fn attribute_names(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.el(id).attrs.iter().map(|a| a.name.as_str())
    }

    /// Decoded attribute value; `Some("")` for a valueless attribute.
    ///
    /// With duplicated attributes the first one wins, as in browsers.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<Cow<'_, str>> {
        let attr = self.find_attr(id, name)?;
        Some(match &attr.span.value {
            Some(value) => unescape(&self.source[value.inner.clone()]),
            None => Cow::Borrowed(""),
        })
    }

    /// Raw inner content (source text between start and end tag).
    pub fn inner(&self, id: NodeId) -> Option<&str> {
        self.el(id)
            .inner
            .as_ref()
            .map(|range| &self.source[range.clone()])
    }

    /// Set an attribute value, adding the attribute if it is missing.
    ///
    /// Writing the value the attribute already has records no edit.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        let name = name.to_ascii_lowercase();
        let forbidden =
            |b: u8| b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'/');
        if name.is_empty() || name.bytes().any(forbidden) {
            return Err(DocumentError::InvalidAttributeName(name));
        }

        let key = EditKey::Attribute(id, name.clone());
        if self.attribute(id, &name).as_deref() == Some(value) {
            self.edits.remove(&key);
            return Ok(());
        }

        let (range, text) = match self.find_attr(id, &name) {
            Some(attr) => match &attr.span.value {
                Some(current) => match current.quote {
                    Some(quote) => (
                        current.inner.clone(),
                        escape_attr(value, quote).into_owned(),
                    ),
                    None => (
                        current.inner.clone(),
                        format!("\"{}\"", escape_attr(value, '"')),
                    ),
                },
                None => {
                    let end = attr.span.name.end;
                    (end..end, format!("=\"{}\"", escape_attr(value, '"')))
                }
            },
            None => {
                let el = self.el(id);
                let at = if el.self_closing {
                    el.tag_close - 1
                } else {
                    el.tag_close
                };
                (at..at, format!(" {name}=\"{}\"", escape_attr(value, '"')))
            }
        };

        self.record(key, range, text);
        Ok(())
    }

    /// Replace the inner content of an element.
    ///
    /// Inside raw text elements a literal `</script` (or `</style`) is
    /// written as `<\/script` so it cannot close the element early.
    pub fn set_inner(&mut self, id: NodeId, content: &str) -> Result<(), DocumentError> {
        let el = self.el(id);
        let Some(range) = el.inner.clone() else {
            return Err(DocumentError::NoInnerContent(el.locator.clone()));
        };
        let raw_text = is_raw_text_element(&el.name).then(|| el.name.clone());

        let key = EditKey::Inner(id);
        if self.source[range.clone()] == *content {
            self.edits.remove(&key);
            return Ok(());
        }

        let text = match raw_text {
            Some(name) => escape_close_tag(content, &name),
            None => content.to_string(),
        };
        self.record(key, range, text);
        Ok(())
    }

    /// Serialize with all edits applied.
    ///
    /// Edits are applied in source order. An edit overlapping an earlier one
    /// (an ancestor and a descendant both rewritten) is skipped.
    pub fn to_html(&self) -> String {
        let mut patches: Vec<&Patch> = self.edits.values().collect();
        patches.sort_by_key(|p| (p.range.start, p.range.end, p.seq));

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for patch in patches {
            if patch.range.start < cursor {
                debug!("document"; "skipping overlapping edit at byte {}", patch.range.start);
                continue;
            }
            out.push_str(&self.source[cursor..patch.range.start]);
            out.push_str(&patch.text);
            cursor = patch.range.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }

    /// Number of pending edits.
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    fn el(&self, id: NodeId) -> &Element {
        &self.elements[id.0]
    }

    fn find_attr(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.el(id)
            .attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    fn record(&mut self, key: EditKey, range: Range<usize>, text: String) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.edits.insert(key, Patch { range, text, seq });
    }
}

/// Escape `</name` in raw text content, case-insensitively.
pub(crate) fn escape_close_tag(content: &str, name: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    let mut pos = 0;
    while let Some(at) = find_close_tag(content, pos, name) {
        out.push_str(&content[last..at]);
        out.push_str("<\\/");
        last = at + 2;
        pos = at + 2;
    }
    out.push_str(&content[last..]);
    out
}

// ============================================================================
// Indexing
// ============================================================================

fn index_elements(source: &str) -> Result<Vec<Element>, DocumentError> {
    let masked = mask_raw_text(source);
    let dom = tl::parse(&masked, tl::ParserOptions::default())
        .map_err(|e| DocumentError::Parse(format!("{e:?}")))?;
    let parser = dom.parser();

    let mut walker = Walker {
        source,
        base: masked.as_ptr() as usize,
        elements: Vec::new(),
    };
    walker.walk(
        dom.children(),
        parser,
        &Locator::root(),
        &mut FxHashMap::default(),
    );
    Ok(walker.elements)
}

struct Walker<'s> {
    source: &'s str,
    /// Address of the masked text `tl` borrows from.
    base: usize,
    elements: Vec<Element>,
}

impl Walker<'_> {
    /// Walk sibling `handles` under `parent`; `positions` counts same-named
    /// siblings seen so far.
    fn walk(
        &mut self,
        handles: &[tl::NodeHandle],
        parser: &tl::Parser,
        parent: &Locator,
        positions: &mut FxHashMap<String, usize>,
    ) {
        for handle in handles {
            let Some(tl::Node::Tag(tag)) = handle.get(parser) else {
                continue;
            };
            let tl_name = tag.name().as_utf8_str().to_ascii_lowercase();
            let children: Vec<tl::NodeHandle> = tag.children().top().iter().copied().collect();

            let raw = tag.raw().as_bytes();
            let span = (raw.as_ptr() as usize)
                .checked_sub(self.base)
                .filter(|start| start + raw.len() <= self.source.len())
                .map(|start| start..start + raw.len());

            // Names come from the source: the masked text `tl` parsed has
            // some name bytes replaced.
            let name = span
                .as_ref()
                .and_then(|span| tag_name_at(self.source, span.start))
                .unwrap_or_else(|| tl_name.trim_end_matches('/').to_string());

            // A raw text tag written `<script/>` reaches `tl` unmasked, which
            // names it `script/` and nests the following siblings under it.
            let slashed = tl_name.ends_with('/');

            // Declarations like <!DOCTYPE> are not elements; anything nested
            // under one still belongs to the enclosing parent.
            if name.starts_with(['!', '?']) || !is_step_name(&name) {
                self.walk(&children, parser, parent, positions);
                continue;
            }

            let position = positions.entry(name.clone()).or_insert(0);
            *position += 1;
            let locator = parent.child(&name, *position);

            match span.and_then(|span| self.element(&name, span, locator.clone())) {
                Some(element) => self.elements.push(element),
                None => debug!("document"; "no source span for <{}> at {}", name, locator),
            }

            if slashed {
                self.walk(&children, parser, parent, positions);
            } else if !is_raw_text_element(&name) {
                self.walk(&children, parser, &locator, &mut FxHashMap::default());
            }
        }
    }

    fn element(&self, name: &str, outer: Range<usize>, locator: Locator) -> Option<Element> {
        let source = self.source;
        let start = outer.start;
        if !source.as_bytes()[start..].starts_with(b"<") {
            return None;
        }

        let tag_close = start_tag_close(source, start)?;
        let self_closing = source[..tag_close].ends_with('/');
        let attrs_end = if self_closing { tag_close - 1 } else { tag_close };
        let attrs = scan_attributes(source, start + 1 + name.len(), attrs_end)
            .into_iter()
            .map(|span| Attribute {
                name: source[span.name.clone()].to_ascii_lowercase(),
                span,
            })
            .collect();

        let content_start = tag_close + 1;
        let inner = if self_closing || is_void_element(name) {
            None
        } else if is_raw_text_element(name) {
            find_close_tag(source, content_start, name).map(|end| content_start..end)
        } else {
            closing_tag_start(source, &outer, name)
                .filter(|end| *end >= content_start)
                .map(|end| content_start..end)
        };

        Some(Element {
            name: name.to_string(),
            locator,
            tag_close,
            self_closing,
            attrs,
            inner,
        })
    }
}

/// Start of the `</name>` ending the outer span, if the span ends with one.
fn closing_tag_start(source: &str, outer: &Range<usize>, name: &str) -> Option<usize> {
    let text = source.get(outer.clone())?;
    let text = text.trim_end();
    if !text.ends_with('>') {
        return None;
    }
    let at = text.rfind("</")?;
    let tail = text[at + 2..text.len() - 1].trim_end();
    tail.eq_ignore_ascii_case(name).then_some(outer.start + at)
}

#[cfg(test)]
mod tests {
    use super::*;

    impl HtmlDocument {
        /// Elements with tag `name` in document order.
        fn select(&self, name: &str) -> Vec<NodeId> {
            self.elements().filter(|id| self.name(*id) == name).collect()
        }
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>t</title></head>
<body>
  <div id="box">a</div>
  <button onclick="this.style.color='red'" disabled>go</button>
  <button onClick='say("hi")'>hi</button>
  <script>let x: Array<number> = [1];
if (x.length < 2) console.log("</div>");</script>
</body>
</html>"#;

    #[test]
    fn test_document_order_and_locators() {
        let doc = HtmlDocument::parse(PAGE).unwrap();
        let locators: Vec<String> = doc
            .elements()
            .map(|id| doc.locator(id).to_string())
            .collect();
        assert_eq!(
            locators,
            vec![
                "/html[1]",
                "/html[1]/head[1]",
                "/html[1]/head[1]/title[1]",
                "/html[1]/body[1]",
                "/html[1]/body[1]/div[1]",
                "/html[1]/body[1]/button[1]",
                "/html[1]/body[1]/button[2]",
                "/html[1]/body[1]/script[1]",
            ]
        );
    }

    #[test]
    fn test_attributes_are_decoded() {
        let doc = HtmlDocument::parse(PAGE).unwrap();
        let buttons = doc.select("button");
        assert_eq!(
            doc.attribute(buttons[0], "onclick").as_deref(),
            Some("this.style.color='red'")
        );
        assert_eq!(doc.attribute(buttons[0], "disabled").as_deref(), Some(""));
        assert_eq!(
            doc.attribute(buttons[1], "onclick").as_deref(),
            Some(r#"say("hi")"#)
        );
        assert_eq!(
            doc.attribute_names(buttons[0]).collect::<Vec<_>>(),
            vec!["onclick", "disabled"]
        );
    }

    #[test]
    fn test_script_inner_is_raw() {
        let doc = HtmlDocument::parse(PAGE).unwrap();
        let script = doc.select("script")[0];
        let inner = doc.inner(script).unwrap();
        assert!(inner.starts_with("let x: Array<number>"));
        assert!(inner.ends_with(r#"console.log("</div>");"#));
    }

    #[test]
    fn test_untouched_round_trip() {
        let doc = HtmlDocument::parse(PAGE).unwrap();
        assert_eq!(doc.to_html(), PAGE);
    }

    #[test]
    fn test_set_attribute_variants() {
        let src = r#"<p a="1" b=2 c>x</p><br/>"#;
        let mut doc = HtmlDocument::parse(src).unwrap();
        let p = doc.select("p")[0];
        let br = doc.select("br")[0];
        doc.set_attribute(p, "a", r#"say("x")"#).unwrap();
        doc.set_attribute(p, "b", "3").unwrap();
        doc.set_attribute(p, "c", "on").unwrap();
        doc.set_attribute(p, "d", "new").unwrap();
        doc.set_attribute(br, "class", "x").unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<p a="say(&quot;x&quot;)" b="3" c="on" d="new">x</p><br class="x"/>"#
        );
    }

    #[test]
    fn test_slash_closed_tags_keep_siblings() {
        let src = r#"<p>a<br/><button onclick="this.blur()">b</button></p><br/><script>go()</script>"#;
        let mut doc = HtmlDocument::parse(src).unwrap();
        let locators: Vec<String> = doc
            .elements()
            .map(|id| doc.locator(id).to_string())
            .collect();
        assert_eq!(
            locators,
            vec!["/p[1]", "/p[1]/br[1]", "/p[1]/button[1]", "/br[1]", "/script[1]"]
        );

        let button = doc.resolve(&Locator::parse("/p[1]/button[1]").unwrap()).unwrap();
        let script = doc.resolve(&Locator::parse("/script[1]").unwrap()).unwrap();
        assert_eq!(doc.name(button), "button");
        assert_eq!(doc.inner(script), Some("go()"));
        assert_eq!(doc.inner(doc.select("br")[0]), None);

        doc.set_attribute(button, "onclick", "run()").unwrap();
        doc.set_inner(script, "stop()").unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<p>a<br/><button onclick="run()">b</button></p><br/><script>stop()</script>"#
        );
    }

    #[test]
    fn test_custom_element_locators_parse() {
        let src = "<x-a_b><x-foo.bar></x-foo.bar></x-a_b><svg:rect/><p>x</p>";
        let doc = HtmlDocument::parse(src).unwrap();
        let locators: Vec<&Locator> = doc.elements().map(|id| doc.locator(id)).collect();
        assert_eq!(
            locators.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            vec!["/x-a_b[1]", "/x-a_b[1]/x-foo.bar[1]", "/svg:rect[1]", "/p[1]"]
        );
        for locator in locators {
            assert_eq!(Locator::parse(locator.as_str()).as_ref(), Some(locator));
            assert!(doc.resolve(locator).is_some());
        }
    }

    #[test]
    fn test_same_value_records_no_edit() {
        let mut doc = HtmlDocument::parse(r#"<a onclick="x &amp;&amp; y()">l</a>"#).unwrap();
        let a = doc.select("a")[0];
        doc.set_attribute(a, "onclick", "x && y()").unwrap();
        assert_eq!(doc.edit_count(), 0);
    }

    #[test]
    fn test_set_inner_escapes_close_tag() {
        let mut doc = HtmlDocument::parse("<script>old()</script><p>k</p>").unwrap();
        let script = doc.select("script")[0];
        doc.set_inner(script, "s = '</SCRIPT>';").unwrap();
        assert_eq!(doc.to_html(), r"<script>s = '<\/SCRIPT>';</script><p>k</p>");
    }

    #[test]
    fn test_set_inner_on_void_element_fails() {
        let mut doc = HtmlDocument::parse("<img src=a.png>").unwrap();
        let img = doc.select("img")[0];
        assert!(matches!(
            doc.set_inner(img, "x"),
            Err(DocumentError::NoInnerContent(_))
        ));
    }

    #[test]
    fn test_edits_do_not_move_locators() {
        let src = "<body><script>a()</script><script>b()</script></body>";
        let mut doc = HtmlDocument::parse(src).unwrap();
        let first = Locator::parse("/body[1]/script[1]").unwrap();
        let second = Locator::parse("/body[1]/script[2]").unwrap();

        let id = doc.resolve(&first).unwrap();
        doc.set_inner(id, "\n<p>moved()</p>\n").unwrap();
        let id = doc.resolve(&second).unwrap();
        doc.set_inner(id, "c()").unwrap();

        assert_eq!(
            doc.to_html(),
            "<body><script>\n<p>moved()</p>\n</script><script>c()</script></body>"
        );
    }

    #[test]
    fn test_invalid_attribute_name() {
        let mut doc = HtmlDocument::parse("<p>x</p>").unwrap();
        let p = doc.select("p")[0];
        assert!(doc.set_attribute(p, "on click", "x").is_err());
    }
}

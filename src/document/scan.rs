//! Byte-offset scanning of start tags and raw text.
//!
//! The tree structure comes from `tl`; these helpers recover the exact
//! source spans (`start tag`, attribute names and values, inner content)
//! that edits are patched into, so untouched bytes survive serialization.

use std::ops::Range;

/// Span of one attribute inside a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpan {
    pub name: Range<usize>,
    pub value: Option<ValueSpan>,
}

/// Span of an attribute value, excluding its quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpan {
    pub inner: Range<usize>,
    pub quote: Option<char>,
}

/// Prepare `src` for `tl` without moving any byte offset, so spans found in
/// the masked text index the original source.
///
/// - The content of raw text elements is blanked (newlines are kept, every
///   other byte becomes a space). `tl` treats `<` inside scripts as markup,
///   which breaks on TypeScript generics (`Array<string>`) and comparisons.
/// - Tag name bytes `tl` does not accept (`.`, non-ASCII) become `-`, and a
///   slash right after a start tag name is split from it (`<br/>` is read
///   as `<b />`), so `tl` pairs start and end tags the way the source does.
///   Element names are read from the source, not from `tl`.
///
/// Comments are skipped and left as they are.
pub fn mask_raw_text(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(found) = src[pos..].find('<') {
        let lt = pos + found;
        let rest = &src[lt..];

        if rest.starts_with("<!--") {
            let end = rest[4..].find("-->").map_or(src.len(), |p| lt + 4 + p + 3);
            pos = end;
            continue;
        }

        if let Some((name, slash)) = tag_name_span(rest) {
            let slash = slash && raw_text_tag_at(rest).is_none();
            let name = lt + name.start..lt + name.end;
            if slash || src[name.clone()].bytes().any(|b| !is_tl_name_byte(b)) {
                // `<name/>` becomes `<nam />`, which `tl` closes on the spot.
                // A one-letter name keeps its letter and loses the slash.
                let short = slash && name.len() > 1;
                let kept = if short { name.end - 1 } else { name.end };
                out.push_str(&src[last..name.start]);
                out.extend(src[name.start..kept].bytes().map(|b| {
                    if is_tl_name_byte(b) { b as char } else { '-' }
                }));
                out.push_str(match (slash, short) {
                    (true, true) => " /",
                    (true, false) => " ",
                    (false, _) => "",
                });
                last = if slash { name.end + 1 } else { name.end };
            }
        }

        let Some(name) = raw_text_tag_at(rest) else {
            pos = lt + 1;
            continue;
        };
        let Some(close) = start_tag_close(src, lt) else {
            break;
        };
        let content_start = close + 1;
        if src[..content_start].ends_with("/>") {
            pos = content_start;
            continue;
        }

        let content_end = find_close_tag(src, content_start, name).unwrap_or(src.len());
        out.push_str(&src[last..content_start]);
        for ch in src[content_start..content_end].chars() {
            if ch == '\n' {
                out.push('\n');
            } else {
                out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
            }
        }
        last = content_end;
        pos = content_end;
    }

    out.push_str(&src[last..]);
    out
}

/// Bytes `tl` reads as part of a tag name, apart from `/`.
fn is_tl_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'+')
}

/// Name span of the start or end tag `rest` begins with (relative to
/// `rest`), and whether a start tag name is directly followed by `/`.
fn tag_name_span(rest: &str) -> Option<(Range<usize>, bool)> {
    let bytes = rest.as_bytes();
    let start = if bytes.get(1) == Some(&b'/') { 2 } else { 1 };
    if !bytes.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let end = rest[start..]
        .find(|c: char| c.is_ascii_whitespace() || matches!(c, '/' | '>' | '<' | '"' | '\'' | '='))
        .map_or(rest.len(), |p| start + p);
    let slash = start == 1 && bytes.get(end) == Some(&b'/');
    Some((start..end, slash))
}

/// Lowercased name of the start tag at `start` (a `<`), as written in the
/// source.
pub fn tag_name_at(src: &str, start: usize) -> Option<String> {
    let rest = src.get(start..)?;
    let (name, _) = tag_name_span(rest).filter(|(name, _)| name.start == 1)?;
    Some(rest[name].to_ascii_lowercase())
}

/// If `rest` starts with a `<script` or `<style` start tag, return the name.
pub fn raw_text_tag_at(rest: &str) -> Option<&'static str> {
    ["script", "style"].into_iter().find(|name| {
        let end = 1 + name.len();
        rest.len() > end
            && rest.as_bytes()[1..end].eq_ignore_ascii_case(name.as_bytes())
            && matches!(rest.as_bytes()[end], b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
    })
}

/// Index of the `>` closing the start tag that begins at `start` (a `<`).
///
/// Quotes only delimit a value when they directly follow `=` (after
/// optional whitespace), so a stray quote in a name cannot swallow the tag.
pub fn start_tag_close(src: &str, start: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    let mut after_eq = false;

    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i),
            q @ (b'"' | b'\'') if after_eq => {
                let close = src[i + 1..].find(q as char)?;
                i += close + 2;
                after_eq = false;
                continue;
            }
            b'=' => after_eq = true,
            b if b.is_ascii_whitespace() => {}
            _ => after_eq = false,
        }
        i += 1;
    }
    None
}

/// Find the `</name` that closes a raw text element, case-insensitively.
pub fn find_close_tag(src: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let needle_len = 2 + name.len();
    let mut pos = from;

    while let Some(found) = src[pos..].find("</") {
        let at = pos + found;
        let matches_name = bytes.len() >= at + needle_len
            && bytes[at + 2..at + needle_len].eq_ignore_ascii_case(name.as_bytes());
        let boundary = bytes
            .get(at + needle_len)
            .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
        if matches_name && boundary {
            return Some(at);
        }
        pos = at + 2;
    }
    None
}

/// Scan attributes in `src[start..end]` (the start tag after its name,
/// before `>` or `/>`).
///
/// Input: `id="box" onclick='go()' disabled`
/// Output: three spans, the last without a value.
pub fn scan_attributes(src: &str, start: usize, end: usize) -> Vec<AttrSpan> {
    let bytes = src.as_bytes();
    let mut attrs = Vec::new();
    let mut i = start;

    let skip_ws = |mut i: usize| {
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    while i < end {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }

        // Read attribute name
        let name_start = i;
        while i < end && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/') {
            i += 1;
        }
        let name = name_start..i;
        if name.is_empty() {
            i += 1;
            continue;
        }

        // Check for value
        let j = skip_ws(i);
        if j >= end || bytes[j] != b'=' {
            // Boolean attribute (no value)
            attrs.push(AttrSpan { name, value: None });
            continue;
        }
        let k = skip_ws(j + 1);

        let value = match bytes.get(k) {
            Some(&q @ (b'"' | b'\'')) if k < end => {
                let close = src[k + 1..end].find(q as char).map_or(end, |p| k + 1 + p);
                i = (close + 1).min(end);
                ValueSpan {
                    inner: k + 1..close,
                    quote: Some(q as char),
                }
            }
            _ => {
                // Unquoted value (read until whitespace)
                let mut e = k;
                while e < end && !bytes[e].is_ascii_whitespace() {
                    e += 1;
                }
                i = e;
                ValueSpan {
                    inner: k..e,
                    quote: None,
                }
            }
        };
        attrs.push(AttrSpan {
            name,
            value: Some(value),
        });
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr_texts<'a>(src: &'a str, attrs: &[AttrSpan]) -> Vec<(&'a str, Option<&'a str>)> {
        attrs
            .iter()
            .map(|a| {
                (
                    &src[a.name.clone()],
                    a.value.as_ref().map(|v| &src[v.inner.clone()]),
                )
            })
            .collect()
    }

    #[test]
    fn test_mask_keeps_offsets() {
        let src = "<p>x</p><script>let a: Array<string> = [];\nif (a<b) {}</script><i>y</i>";
        let masked = mask_raw_text(src);
        assert_eq!(masked.len(), src.len());
        assert!(!masked.contains("Array"));
        assert_eq!(masked.find("<i>"), src.find("<i>"));
        assert_eq!(masked.matches('\n').count(), 1);
    }

    #[test]
    fn test_mask_unicode_script() {
        let src = "<script>const s = '✓';</script>";
        let masked = mask_raw_text(src);
        assert_eq!(masked.len(), src.len());
        assert!(masked.ends_with("</script>"));
    }

    #[test]
    fn test_mask_ignores_commented_script() {
        let src = "<!-- <script> --><p>a</p>";
        assert_eq!(mask_raw_text(src), src);
    }

    #[test]
    fn test_mask_tag_names_for_tl() {
        let src = "<p>a<br/>b</p><x-foo.bar>c</x-foo.bar><x-ñ/><i/><script/>";
        let masked = mask_raw_text(src);
        assert_eq!(masked.len(), src.len());
        assert_eq!(
            masked,
            "<p>a<b />b</p><x-foo-bar>c</x-foo-bar><x-- /><i ><script/>"
        );
    }

    #[test]
    fn test_tag_name_at() {
        let src = "<X-Foo.Bar a=1><br/></x-foo.bar>";
        assert_eq!(tag_name_at(src, 0).as_deref(), Some("x-foo.bar"));
        assert_eq!(tag_name_at(src, 15).as_deref(), Some("br"));
        assert_eq!(tag_name_at(src, 20), None);
        assert_eq!(tag_name_at(src, 1), None);
    }

    #[test]
    fn test_start_tag_close_with_quoted_gt() {
        let src = r#"<button onclick="if (a > b) go()">x</button>"#;
        let close = start_tag_close(src, 0).unwrap();
        assert_eq!(&src[close..close + 2], ">x");
    }

    #[test]
    fn test_find_close_tag_case_insensitive() {
        let src = "<script>a</b></SCRIPT>";
        assert_eq!(find_close_tag(src, 8, "script"), Some(13));
        assert_eq!(find_close_tag("<script>x</scripts>", 8, "script"), None);
    }

    #[test]
    fn test_scan_attributes() {
        let src = r#"<div id="box" onclick='go("x")' data-n=3 hidden>"#;
        let attrs = scan_attributes(src, 4, src.len() - 1);
        assert_eq!(
            attr_texts(src, &attrs),
            vec![
                ("id", Some("box")),
                ("onclick", Some(r#"go("x")"#)),
                ("data-n", Some("3")),
                ("hidden", None),
            ]
        );
        assert_eq!(attrs[1].value.as_ref().unwrap().quote, Some('\''));
        assert_eq!(attrs[2].value.as_ref().unwrap().quote, None);
    }

    #[test]
    fn test_scan_attributes_spacing_and_self_close() {
        let src = r#"<img src = "a.png" alt="" />"#;
        let attrs = scan_attributes(src, 4, src.len() - 2);
        assert_eq!(
            attr_texts(src, &attrs),
            vec![("src", Some("a.png")), ("alt", Some(""))]
        );
    }
}

//! Lexical segmentation of script text.
//!
//! Splits JavaScript/TypeScript source into code, string, template,
//! regex and comment segments. This is not a grammar: it only knows enough
//! to tell whether a byte offset is in code context. It stands in for the
//! parser when a fragment does not parse.
//!
//! All delimiters are ASCII, so scanning bytes never splits a UTF-8
//! sequence and every segment boundary is a char boundary.

use std::ops::Range;

/// Kind of a lexical segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    String,
    /// Template literal text, including the backticks and `${` / `}` glue.
    Template,
    Regex,
    LineComment,
    BlockComment,
}

impl SegmentKind {
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }
}

/// A contiguous byte range of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range<usize>,
}

/// Previous significant token, used to decide whether `/` starts a regex.
#[derive(Clone, Copy)]
enum Last {
    Start,
    Punct(u8),
    Word(usize, usize),
    Operand,
}

/// Keywords after which a `/` begins a regex literal rather than a division.
const REGEX_KEYWORDS: &[&str] = &[
    "await",
    "case",
    "delete",
    "do",
    "else",
    "in",
    "instanceof",
    "new",
    "of",
    "return",
    "throw",
    "typeof",
    "void",
    "yield",
];

#[inline]
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Segment `src` into lexical runs.
pub fn segments(src: &str) -> Vec<Segment> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    out: Vec<Segment>,
    code_start: usize,
    last: Last,
    brace_depth: usize,
    /// Brace depth at which each open `${` substitution resumes template text.
    templates: Vec<usize>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            out: Vec::new(),
            code_start: 0,
            last: Last::Start,
            brace_depth: 0,
            templates: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Segment> {
        let len = self.bytes.len();
        let mut i = 0;

        while i < len {
            let c = self.bytes[i];
            i = match c {
                b'\'' | b'"' => {
                    let end = self.string_end(i, c);
                    self.push(SegmentKind::String, i, end);
                    self.last = Last::Operand;
                    end
                }
                b'`' => self.template(i),
                b'}' if self.templates.last() == Some(&self.brace_depth) => {
                    self.templates.pop();
                    self.template(i)
                }
                b'/' => self.slash(i),
                b'{' => {
                    self.brace_depth += 1;
                    self.last = Last::Punct(c);
                    i + 1
                }
                b'}' => {
                    self.brace_depth = self.brace_depth.saturating_sub(1);
                    self.last = Last::Punct(c);
                    i + 1
                }
                b')' | b']' => {
                    self.last = Last::Operand;
                    i + 1
                }
                c if c.is_ascii_whitespace() => i + 1,
                c if is_ident_byte(c) => {
                    let end = self.ident_end(i);
                    self.last = if c.is_ascii_digit() {
                        Last::Operand
                    } else {
                        Last::Word(i, end)
                    };
                    end
                }
                _ => {
                    self.last = Last::Punct(c);
                    i + 1
                }
            };
        }

        if self.code_start < len {
            self.out.push(Segment {
                kind: SegmentKind::Code,
                range: self.code_start..len,
            });
        }
        self.out
    }

    /// Flush pending code and record a non-code segment.
    fn push(&mut self, kind: SegmentKind, start: usize, end: usize) {
        if self.code_start < start {
            self.out.push(Segment {
                kind: SegmentKind::Code,
                range: self.code_start..start,
            });
        }
        self.out.push(Segment {
            kind,
            range: start..end,
        });
        self.code_start = end;
    }

    fn ident_end(&self, start: usize) -> usize {
        let mut j = start;
        while j < self.bytes.len() && is_ident_byte(self.bytes[j]) {
            j += 1;
        }
        j
    }

    /// End of a quoted string starting at `start` (exclusive).
    /// Unterminated strings stop at the line end.
    fn string_end(&self, start: usize, quote: u8) -> usize {
        let len = self.bytes.len();
        let mut j = start + 1;
        while j < len {
            match self.bytes[j] {
                b'\\' => j += 2,
                b'\n' => return j,
                b if b == quote => return j + 1,
                _ => j += 1,
            }
        }
        len
    }

    /// Scan template text from a '`' or a substitution-closing '}'.
    fn template(&mut self, start: usize) -> usize {
        let len = self.bytes.len();
        let mut j = start + 1;
        while j < len {
            match self.bytes[j] {
                b'\\' => j += 2,
                b'`' => {
                    self.push(SegmentKind::Template, start, j + 1);
                    self.last = Last::Operand;
                    return j + 1;
                }
                b'$' if self.bytes.get(j + 1) == Some(&b'{') => {
                    self.push(SegmentKind::Template, start, j + 2);
                    self.templates.push(self.brace_depth);
                    self.last = Last::Punct(b'{');
                    return j + 2;
                }
                _ => j += 1,
            }
        }
        self.push(SegmentKind::Template, start, len);
        len
    }

    fn slash(&mut self, start: usize) -> usize {
        let len = self.bytes.len();
        match self.bytes.get(start + 1) {
            Some(b'/') => {
                let end = self.src[start..].find('\n').map_or(len, |p| start + p);
                self.push(SegmentKind::LineComment, start, end);
                end
            }
            Some(b'*') => {
                let end = self.src[start + 2..]
                    .find("*/")
                    .map_or(len, |p| start + 2 + p + 2);
                self.push(SegmentKind::BlockComment, start, end);
                end
            }
            _ if self.regex_allowed() => {
                let end = self.regex_end(start);
                self.push(SegmentKind::Regex, start, end);
                self.last = Last::Operand;
                end
            }
            _ => {
                self.last = Last::Punct(b'/');
                start + 1
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.last {
            Last::Start => true,
            Last::Operand => false,
            Last::Punct(c) => b"(,=:[!&|?{};+-*%<>~^".contains(&c),
            Last::Word(s, e) => REGEX_KEYWORDS.contains(&&self.src[s..e]),
        }
    }

    fn regex_end(&self, start: usize) -> usize {
        let len = self.bytes.len();
        let mut j = start + 1;
        let mut in_class = false;
        while j < len {
            match self.bytes[j] {
                b'\\' => j += 2,
                b'[' => {
                    in_class = true;
                    j += 1;
                }
                b']' => {
                    in_class = false;
                    j += 1;
                }
                b'/' if !in_class => {
                    return self.ident_end(j + 1);
                }
                b'\n' => return j,
                _ => j += 1,
            }
        }
        len
    }
}

/// Whether `offset` lies in a code segment.
pub fn in_code(segments: &[Segment], offset: usize) -> bool {
    segments
        .iter()
        .find(|s| s.range.contains(&offset))
        .is_some_and(|s| s.kind == SegmentKind::Code)
}

/// Whether the word at `start..end` stands alone (not part of a longer
/// identifier, not a property name after a single `.`).
pub fn is_standalone_word(src: &str, start: usize, end: usize) -> bool {
    let bytes = src.as_bytes();
    let before_ok = start == 0 || {
        let prev = bytes[start - 1];
        !is_ident_byte(prev) && !(prev == b'.' && !src[..start].ends_with("..."))
    };
    let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
    before_ok && after_ok
}

/// Byte ranges of comments, delimiters included.
pub fn comments(src: &str) -> Vec<Range<usize>> {
    segments(src)
        .into_iter()
        .filter(|s| s.kind.is_comment())
        .map(|s| s.range)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(SegmentKind, &str)> {
        segments(src)
            .into_iter()
            .map(|s| (s.kind, &src[s.range]))
            .collect()
    }

    #[test]
    fn test_strings_and_comments() {
        let src = r#"a = "x // y"; // tail"#;
        assert_eq!(
            kinds(src),
            vec![
                (SegmentKind::Code, "a = "),
                (SegmentKind::String, r#""x // y""#),
                (SegmentKind::Code, "; "),
                (SegmentKind::LineComment, "// tail"),
            ]
        );
    }

    #[test]
    fn test_escaped_quote() {
        let src = r#"'it\'s' + b"#;
        assert_eq!(kinds(src)[0], (SegmentKind::String, r#"'it\'s'"#));
    }

    #[test]
    fn test_template_substitution_is_code() {
        let src = "`a ${this.x + `in ${y}`} b` + this";
        let segs = segments(src);
        let this_positions: Vec<_> = src.match_indices("this").map(|(i, _)| i).collect();
        assert!(in_code(&segs, this_positions[0]));
        assert!(in_code(&segs, this_positions[1]));
        let text_pos = src.find(" b`").unwrap();
        assert!(!in_code(&segs, text_pos));
    }

    #[test]
    fn test_regex_vs_division() {
        let src = "x = a / b / c; y = /'[/]'/g.test(s)";
        let segs = segments(src);
        assert!(segs.iter().all(|s| s.kind != SegmentKind::String));
        assert!(segs.iter().any(|s| s.kind == SegmentKind::Regex));
    }

    #[test]
    fn test_regex_after_return() {
        let src = "return /\"/.test(s)";
        let k = kinds(src);
        assert_eq!(k[1], (SegmentKind::Regex, "/\"/"));
    }

    #[test]
    fn test_standalone_word() {
        let src = "this.a; thisValue; o.this; ...this";
        let hits: Vec<_> = src
            .match_indices("this")
            .filter(|(i, _)| is_standalone_word(src, *i, i + 4))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![0, src.rfind("this").unwrap()]);
    }

    #[test]
    fn test_comment_ranges() {
        let src = "let a = 1; // one\nlet s = \"/* keep */\"; /* drop */ let b = 2;";
        let found: Vec<&str> = comments(src).into_iter().map(|r| &src[r]).collect();
        assert_eq!(found, vec!["// one", "/* drop */"]);
    }

    #[test]
    fn test_unicode_text_is_safe() {
        let src = "const s = 'héllo'; // ünïcode\nf('✓')";
        let found: Vec<&str> = comments(src).into_iter().map(|r| &src[r]).collect();
        assert_eq!(found, vec!["// ünïcode"]);
    }
}

//! Syntax queries over script text.
//!
//! Handler bodies and scripts are parsed with oxc. Text that does not parse
//! (a typo the type checker will report anyway) falls back to [`lexer`],
//! which tells code from strings, comments and regexes but knows no grammar.

pub mod lexer;

use lexer::{in_code, is_ident_byte, is_standalone_word, segments};
use oxc::allocator::Allocator;
use oxc::ast::ast::{
    CallExpression, ClassBody, Function, Program, TSNonNullExpression, ThisExpression,
};
use oxc::ast_visit::{Visit, walk};
use oxc::parser::{ParseOptions, Parser};
use oxc::span::{GetSpan, SourceType, Span};
use oxc::syntax::scope::ScopeFlags;
use std::ops::Range;

const SELF: &str = "this";

/// Parse `src`, or `None` if it has syntax errors.
///
/// `return` is accepted at the top level, as in a handler attribute.
fn parse<'a>(
    alloc: &'a Allocator,
    src: &'a str,
    source_type: SourceType,
) -> Option<Program<'a>> {
    let ret = Parser::new(alloc, src, source_type)
        .with_options(ParseOptions {
            allow_return_outside_function: true,
            ..ParseOptions::default()
        })
        .parse();
    (ret.errors.is_empty() && !ret.panicked).then_some(ret.program)
}

/// Source type of a handler body: a TypeScript script.
fn body_type() -> SourceType {
    SourceType::ts().with_script(true)
}

fn range(span: Span) -> Range<usize> {
    span.start as usize..span.end as usize
}

// ============================================================================
// Self references
// ============================================================================

/// Collects `this` expressions bound to the enclosing handler.
///
/// `function` bodies and class bodies rebind `this`, so they are not
/// entered. Arrow functions are.
#[derive(Default)]
struct ThisFinder {
    spans: Vec<Range<usize>>,
}

impl<'a> Visit<'a> for ThisFinder {
    fn visit_this_expression(&mut self, it: &ThisExpression) {
        self.spans.push(range(it.span));
    }

    fn visit_function(&mut self, _it: &Function<'a>, _flags: ScopeFlags) {}

    fn visit_class_body(&mut self, _it: &ClassBody<'a>) {}
}

/// Byte ranges of the `this` expressions of a handler body, in source order.
pub fn this_spans(body: &str) -> Vec<Range<usize>> {
    let alloc = Allocator::default();
    if let Some(program) = parse(&alloc, body, body_type()) {
        let mut finder = ThisFinder::default();
        finder.visit_program(&program);
        return finder.spans;
    }

    let segs = segments(body);
    body.match_indices(SELF)
        .map(|(at, _)| at..at + SELF.len())
        .filter(|r| in_code(&segs, r.start) && is_standalone_word(body, r.start, r.end))
        .collect()
}

/// Collects call expressions written exactly as `text`, together with a
/// non-null assertion applied to them.
struct CallFinder<'s> {
    src: &'s str,
    text: &'s str,
    spans: Vec<Range<usize>>,
}

impl CallFinder<'_> {
    fn is_match(&self, span: Span) -> bool {
        self.src.get(range(span)) == Some(self.text)
    }
}

impl<'a> Visit<'a> for CallFinder<'_> {
    fn visit_ts_non_null_expression(&mut self, it: &TSNonNullExpression<'a>) {
        if self.is_match(it.expression.span()) {
            self.spans.push(range(it.span));
        } else {
            walk::walk_ts_non_null_expression(self, it);
        }
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if self.is_match(it.span) {
            self.spans.push(range(it.span));
        } else {
            walk::walk_call_expression(self, it);
        }
    }
}

/// Byte ranges where the call `text` occurs in code, each extended over a
/// directly following non-null `!`.
pub fn call_spans(body: &str, text: &str) -> Vec<Range<usize>> {
    let alloc = Allocator::default();
    if let Some(program) = parse(&alloc, body, body_type()) {
        let mut finder = CallFinder {
            src: body,
            text,
            spans: Vec::new(),
        };
        finder.visit_program(&program);
        return finder.spans;
    }

    let segs = segments(body);
    let mut spans: Vec<Range<usize>> = Vec::new();
    for (at, _) in body.match_indices(text) {
        if spans.last().is_some_and(|r| at < r.end) || !in_code(&segs, at) {
            continue;
        }
        let mut end = at + text.len();
        let rest = &body[end..];
        if rest.starts_with('!') && !rest.starts_with("!=") {
            end += 1;
        }
        spans.push(at..end);
    }
    spans
}

// ============================================================================
// Comments
// ============================================================================

/// Remove comments, keeping literals that merely look like comments.
///
/// A block comment that spans lines leaves a newline behind so automatic
/// semicolon insertion still sees the line break. One that separates two
/// words leaves a space.
pub fn strip_comments(src: &str, module: bool) -> String {
    let alloc = Allocator::default();
    let source_type = if module {
        SourceType::mjs()
    } else {
        SourceType::script()
    };
    let comments: Vec<Range<usize>> = match parse(&alloc, src, source_type) {
        Some(program) => program.comments.iter().map(|c| range(c.span)).collect(),
        None => lexer::comments(src),
    };

    let bytes = src.as_bytes();
    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    for comment in comments {
        out.push_str(&src[last..comment.start]);
        let text = &src[comment.clone()];
        if text.starts_with("/*") {
            if text.contains('\n') {
                out.push('\n');
            } else if comment.start > 0
                && comment.end < bytes.len()
                && is_ident_byte(bytes[comment.start - 1])
                && is_ident_byte(bytes[comment.end])
            {
                out.push(' ');
            }
        }
        last = comment.end;
    }
    out.push_str(&src[last..]);
    out
}

//! Self-reference rewriting for handler bodies.
//!
//! Inside an attribute handler `this` is the element. Once the body is moved
//! into a free-standing arrow function that no longer holds, so `this` is
//! replaced by an accessor expression for the element, and swapped back after
//! transformation.

use crate::utils::js::{call_spans, this_spans};
use std::ops::Range;

const SELF: &str = "this";

/// Temporary accessor for a handler's element.
pub fn make_accessor(key: &str) -> String {
    format!("document.getElementById('__tshtml_{key}')")
}

/// Replace every `this` bound to the handler with `accessor!`.
///
/// `this` inside a nested `function` or class body refers to something else
/// and is left alone.
pub fn bind(body: &str, accessor: &str) -> String {
    splice(body, &this_spans(body), &format!("{accessor}!"))
}

/// Replace `accessor` (and a directly following non-null assertion) with
/// `this` wherever it is called in code.
pub fn unbind(body: &str, accessor: &str) -> String {
    splice(body, &call_spans(body, accessor), SELF)
}

/// Replace the sorted, disjoint `spans` of `text` with `with`.
fn splice(text: &str, spans: &[Range<usize>], with: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        out.push_str(with);
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

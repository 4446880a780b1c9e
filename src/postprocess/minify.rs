//! Inline script and style minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify JavaScript source code.
///
/// Whitespace and comments only: names are neither mangled nor folded, since
/// handler attributes elsewhere in the document refer to script globals.
/// Returns `None` if the source does not parse.
pub fn minify_js(source: &str, module: bool) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = if module {
        SourceType::mjs()
    } else {
        SourceType::cjs()
    };
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() || ret.panicked {
        return None;
    }
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .build(&ret.program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_js_keeps_names() {
        let src = "function toggle(el) {\n  // flip\n  el.hidden = !el.hidden;\n}\n";
        let out = minify_js(src, false).unwrap();
        assert!(out.contains("function toggle(el)"));
        assert!(!out.contains("flip"));
        assert_eq!(out.trim_end().lines().count(), 1);
    }

    #[test]
    fn test_minify_js_module() {
        let out = minify_js("import { sq } from './sq.js';\nconsole.log(sq(2));", true).unwrap();
        assert!(out.contains("sq(2)"));
    }

    #[test]
    fn test_minify_js_invalid() {
        assert_eq!(minify_js("let = = ;", false), None);
    }

    #[test]
    fn test_minify_css() {
        let out = minify_css("body {\n  color: red;\n}\n").unwrap();
        assert_eq!(out, "body{color:red}");
    }
}

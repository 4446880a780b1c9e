//! Handler body recovery from compiled wrapper functions.

use regex::Regex;
use std::sync::LazyLock;

/// Opener of the wrapper function, as written or as down-levelled.
static OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\(event\)\s*=>|function\s*\(event\))\s*\{").expect("valid regex")
});

/// Body of the wrapper function in a compiled handler fragment.
///
/// Takes the text between the opener and the fragment's last `}`, removes
/// one line break on each side, then trims a single-line body or dedents a
/// multi-line one.
pub fn extract_body(fragment: &str) -> Option<String> {
    let opener = OPENER.find(fragment)?;
    let close = fragment.rfind('}').filter(|close| *close >= opener.end())?;
    let body = &fragment[opener.end()..close];

    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    let body = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body);

    if body.contains('\n') {
        Some(dedent(body))
    } else {
        Some(body.trim().to_string())
    }
}

/// Remove the indentation shared by all non-blank lines.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_blanks)
        .min()
        .unwrap_or(0);

    text.split_inclusive('\n')
        .map(|line| {
            let strip = indent.min(leading_blanks(line));
            &line[strip..]
        })
        .collect()
}

fn leading_blanks(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_wrapper() {
        let fragment = "x.onclick = (event) => {\n    x.remove();\n};\n";
        assert_eq!(extract_body(fragment).as_deref(), Some("x.remove();"));
    }

    #[test]
    fn test_function_wrapper() {
        let fragment = "x.onclick = function (event) {\n    go(event);\n};\n";
        assert_eq!(extract_body(fragment).as_deref(), Some("go(event);"));
    }

    #[test]
    fn test_multiline_dedent() {
        let fragment = "x.onclick = (event) => {\n    if (a) {\n        b();\n    }\n};";
        assert_eq!(
            extract_body(fragment).as_deref(),
            Some("if (a) {\n    b();\n}")
        );
    }

    #[test]
    fn test_dedent_keeps_blank_lines() {
        assert_eq!(dedent("    a();\n\n    b();"), "a();\n\nb();");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            extract_body("x.onclick = (event) => {\n\n};").as_deref(),
            Some("")
        );
        assert_eq!(extract_body("x.onclick = (event) => { };").as_deref(), Some(""));
    }

    #[test]
    fn test_no_wrapper() {
        assert_eq!(extract_body("x.onclick = handler;"), None);
        assert_eq!(extract_body(""), None);
    }

    #[test]
    fn test_crlf() {
        let fragment = "x.onclick = (event) => {\r\n    go();\r\n};\r\n";
        assert_eq!(extract_body(fragment).as_deref(), Some("go();"));
    }
}

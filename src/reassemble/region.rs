//! Region location and (body, annotation) splitting.

use crate::annotation::{Annotation, KindTag};
use crate::error::WeaveError;
use crate::unit::{ANCHOR, BoundaryTokens, Region};

/// Text strictly between a region's open and close marker lines.
pub fn region_text<'a>(
    output: &'a str,
    tokens: &BoundaryTokens,
    region: Region,
) -> Result<&'a str, WeaveError> {
    let not_found = || WeaveError::RegionNotFound { region };

    let mut offset = 0;
    let mut start = None;
    for line in output.split_inclusive('\n') {
        let text = line.trim();
        match start {
            None if text == tokens.open(region) => start = Some(offset + line.len()),
            Some(start) if text == tokens.close(region) => return Ok(&output[start..offset]),
            // A close marker before the open one.
            None if text == tokens.close(region) => return Err(not_found()),
            _ => {}
        }
        offset += line.len();
    }
    Err(not_found())
}

/// Split region text into bodies, each closed by an annotation of `kind`.
///
/// A line is an annotation only if it ends in a token that decodes fully
/// for `kind`; any code before the token on that line belongs to the body.
/// An anchor line directly after the region start or an annotation is
/// dropped. Text after the last annotation has no owner and is discarded.
pub fn split_pairs(text: &str, kind: KindTag) -> Vec<(String, Annotation)> {
    let mut pairs = Vec::new();
    let mut body = String::new();
    let mut after_marker = true;

    for line in text.split_inclusive('\n') {
        if std::mem::take(&mut after_marker) && line.trim() == ANCHOR {
            continue;
        }
        match Annotation::find_in_line(line, kind) {
            Some((prefix, annotation)) => {
                body.push_str(prefix);
                pairs.push((std::mem::take(&mut body), annotation));
                after_marker = true;
            }
            None => body.push_str(line),
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Locator;

    fn script_token() -> (Annotation, String) {
        let a = Annotation::script(Locator::root().child("script", 1));
        let token = a.encode().unwrap();
        (a, token)
    }

    #[test]
    fn test_region_text() {
        let tokens = BoundaryTokens::new();
        let output = format!(
            "{}\n;\nbody\n{}\n;\n",
            tokens.open(Region::Main),
            tokens.close(Region::Main)
        );
        assert_eq!(region_text(&output, &tokens, Region::Main).unwrap(), ";\nbody\n");
    }

    #[test]
    fn test_region_markers_with_indentation() {
        let tokens = BoundaryTokens::new();
        let output = format!(
            "    {}\r\nx\r\n  {}\r\n",
            tokens.open(Region::Handlers),
            tokens.close(Region::Handlers)
        );
        assert_eq!(
            region_text(&output, &tokens, Region::Handlers).unwrap(),
            "x\r\n"
        );
    }

    #[test]
    fn test_missing_or_reversed_region() {
        let tokens = BoundaryTokens::new();
        let missing_close = format!("{}\nx\n", tokens.open(Region::Main));
        let reversed = format!(
            "{}\nx\n{}\n",
            tokens.close(Region::Main),
            tokens.open(Region::Main)
        );
        for output in [missing_close, reversed, String::new()] {
            assert!(matches!(
                region_text(&output, &tokens, Region::Main),
                Err(WeaveError::RegionNotFound {
                    region: Region::Main
                })
            ));
        }
    }

    #[test]
    fn test_split_pairs() {
        let (a, token_a) = script_token();
        let (b, token_b) = script_token();
        let text = format!(";\nfirst();\n{token_a}\n;\nsecond(); {token_b}\n;\ntrailing();\n");
        let pairs = split_pairs(&text, KindTag::Script);
        assert_eq!(
            pairs,
            vec![("first();\n".to_string(), a), ("second(); ".to_string(), b)]
        );
    }

    #[test]
    fn test_split_pairs_ignores_other_comments() {
        let (a, token) = script_token();
        let text = format!("/* note */\nx(); /*{{}}*/\n{token}\n");
        let pairs = split_pairs(&text, KindTag::Script);
        assert_eq!(pairs, vec![("/* note */\nx(); /*{}*/\n".to_string(), a)]);
    }

    #[test]
    fn test_split_pairs_empty_region() {
        assert!(split_pairs(";\n", KindTag::Handler).is_empty());
        assert!(split_pairs("", KindTag::Script).is_empty());
    }

    #[test]
    fn test_anchor_only_dropped_after_marker() {
        let (a, token) = script_token();
        let text = format!("a();\n;\n{token}\n");
        assert_eq!(split_pairs(&text, KindTag::Script), vec![("a();\n;\n".to_string(), a)]);
    }
}

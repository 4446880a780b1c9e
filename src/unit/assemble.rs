//! Unit layout.

use super::{ANCHOR, BoundaryTokens, Decomposition, Fragment, Region};
use crate::annotation::AnnotationError;

/// Lay out a decomposition as unit text, with `prelude` appended after the
/// main region.
pub fn assemble(
    decomposition: &Decomposition,
    tokens: &BoundaryTokens,
    prelude: &str,
) -> Result<String, AnnotationError> {
    let mut unit = String::new();

    open(&mut unit, tokens, Region::Declarations);
    for decl in &decomposition.declarations {
        line(&mut unit, decl);
    }
    close(&mut unit, tokens, Region::Declarations);

    open(&mut unit, tokens, Region::Handlers);
    for fragment in &decomposition.handlers {
        line(&mut unit, &fragment.code);
        annotate(&mut unit, fragment)?;
    }
    close(&mut unit, tokens, Region::Handlers);

    open(&mut unit, tokens, Region::Main);
    for fragment in &decomposition.scripts {
        // Script text is always followed by exactly one newline of ours,
        // which reassembly strips again.
        line(&mut unit, &fragment.code);
        annotate(&mut unit, fragment)?;
    }
    close(&mut unit, tokens, Region::Main);

    if !prelude.is_empty() {
        unit.push_str(prelude);
        if !prelude.ends_with('\n') {
            unit.push('\n');
        }
    }
    Ok(unit)
}

fn line(unit: &mut String, text: &str) {
    unit.push_str(text);
    unit.push('\n');
}

fn open(unit: &mut String, tokens: &BoundaryTokens, region: Region) {
    line(unit, tokens.open(region));
    line(unit, ANCHOR);
}

fn close(unit: &mut String, tokens: &BoundaryTokens, region: Region) {
    line(unit, tokens.close(region));
    line(unit, ANCHOR);
}

fn annotate(unit: &mut String, fragment: &Fragment) -> Result<(), AnnotationError> {
    line(unit, &fragment.annotation.encode()?);
    line(unit, ANCHOR);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::document::Locator;

    fn script(code: &str) -> Fragment {
        Fragment {
            code: code.to_string(),
            annotation: Annotation::script(Locator::root().child("script", 1)),
        }
    }

    #[test]
    fn test_region_order_and_markers() {
        let tokens = BoundaryTokens::new();
        let decomposition = Decomposition {
            declarations: vec!["let a = 1;".into()],
            handlers: vec![],
            scripts: vec![script("f()")],
        };
        let unit = assemble(&decomposition, &tokens, "declare const env: string;").unwrap();

        let pos = |s: &str| unit.find(s).unwrap();
        let order = [
            pos(tokens.open(Region::Declarations)),
            pos("let a = 1;"),
            pos(tokens.close(Region::Declarations)),
            pos(tokens.open(Region::Handlers)),
            pos(tokens.close(Region::Handlers)),
            pos(tokens.open(Region::Main)),
            pos("f()"),
            pos(tokens.close(Region::Main)),
            pos("declare const env"),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        // Every marker sits alone on its line, followed by an anchor.
        for region in Region::ALL {
            for token in [tokens.open(region), tokens.close(region)] {
                let framed = format!("{token}\n;\n");
                assert!(unit.starts_with(&framed) || unit.contains(&format!("\n{framed}")));
            }
        }
        assert!(unit.ends_with("declare const env: string;\n"));
    }

    #[test]
    fn test_fragment_followed_by_annotation() {
        let tokens = BoundaryTokens::new();
        let fragment = script("a();\nb();\n");
        let token = fragment.annotation.encode().unwrap();
        let decomposition = Decomposition {
            scripts: vec![fragment],
            ..Decomposition::default()
        };
        let unit = assemble(&decomposition, &tokens, "").unwrap();
        assert!(unit.contains(&format!("a();\nb();\n\n{token}\n;\n")));
    }
}

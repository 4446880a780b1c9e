//! Reassembly of compiled fragments into the host document.
//!
//! The compiled unit is scanned per region; every (body, annotation) pair is
//! written back into the element its locator names. Locators resolve against
//! the parsed document, which edits never change, so the order in which
//! fragments are applied does not affect where they land.

mod handler;
mod region;

pub use handler::extract_body;
pub use region::{region_text, split_pairs};

use crate::annotation::{Annotation, AnnotationKind, KindTag};
use crate::document::{HtmlDocument, NodeId};
use crate::error::WeaveError;
use crate::unit::{BoundaryTokens, Region, unbind};
use crate::{debug, log};

/// Outcome of reassembling one document.
#[derive(Debug, Default)]
pub struct Reassembly {
    /// Handler fragments found in the output.
    pub handlers: usize,
    /// Script fragments found in the output.
    pub scripts: usize,
    /// Fragments that could not be placed (`NodeNotFound`).
    pub unresolved: Vec<WeaveError>,
}

impl Reassembly {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Write compiled fragments from `output` back into `doc`.
///
/// A missing region fails the whole document. A fragment whose element
/// cannot be found is recorded in [`Reassembly::unresolved`] and the rest
/// are still applied.
pub fn reassemble(
    output: &str,
    tokens: &BoundaryTokens,
    doc: &mut HtmlDocument,
) -> Result<Reassembly, WeaveError> {
    let handler_text = region_text(output, tokens, Region::Handlers)?;
    let main_text = region_text(output, tokens, Region::Main)?;

    let mut report = Reassembly::default();

    let handlers = split_pairs(handler_text, KindTag::Handler);
    report.handlers = handlers.len();
    for (body, annotation) in handlers {
        let Some(id) = resolve(doc, &annotation, &mut report) else {
            continue;
        };
        let AnnotationKind::Handler {
            attribute,
            accessor,
        } = &annotation.kind
        else {
            continue;
        };
        match extract_body(&body) {
            Some(compiled) => doc.set_attribute(id, attribute, &unbind(&compiled, accessor))?,
            None => log!(
                "warning";
                "no handler function for {} at {}, left unchanged",
                attribute,
                annotation.locator
            ),
        }
    }

    let scripts = split_pairs(main_text, KindTag::Script);
    report.scripts = scripts.len();
    for (body, annotation) in scripts {
        let Some(id) = resolve(doc, &annotation, &mut report) else {
            continue;
        };
        if is_import_container(doc, id) {
            continue;
        }
        let body = body.strip_suffix('\n').unwrap_or(&body);
        doc.set_inner(id, body)?;
    }

    debug!(
        "reassemble";
        "{} handler(s), {} script(s), {} unresolved",
        report.handlers,
        report.scripts,
        report.unresolved.len()
    );
    Ok(report)
}

fn resolve(
    doc: &HtmlDocument,
    annotation: &Annotation,
    report: &mut Reassembly,
) -> Option<NodeId> {
    let id = doc.resolve(&annotation.locator);
    if id.is_none() {
        report.unresolved.push(WeaveError::NodeNotFound {
            locator: annotation.locator.clone(),
            id: annotation.id,
        });
    }
    id
}

/// Scripts that were compiled as imports keep their original content.
fn is_import_container(doc: &HtmlDocument, id: NodeId) -> bool {
    doc.attribute(id, "src").is_some_and(|src| !src.trim().is_empty())
        || doc
            .attribute(id, "type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("importmap"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Locator;
    use crate::unit::{assemble, decompose, HandlerMode};

    fn identity_round_trip(src: &str) -> (String, Reassembly) {
        let mut doc = HtmlDocument::parse(src).unwrap();
        let tokens = BoundaryTokens::new();
        let unit = assemble(&decompose(&doc, HandlerMode::Known), &tokens, "").unwrap();
        let report = reassemble(&unit, &tokens, &mut doc).unwrap();
        (doc.to_html(), report)
    }

    #[test]
    fn test_identity_restores_document() {
        let src = r#"<body><div id="box"></div>
<button onclick="this.style.color = 'red'" onmouseover='say("hi")'>go</button>
<script>
  console.log(1);
</script>
<script src="lib.js"></script>
</body>"#;
        let (html, report) = identity_round_trip(src);
        assert_eq!(html, src);
        assert_eq!(report.handlers, 2);
        assert_eq!(report.scripts, 2);
        assert!(report.is_complete());
    }

    /// Transformer output with the given region contents.
    fn compiled(tokens: &BoundaryTokens, handlers: &str, main: &str) -> String {
        format!(
            "{}\n;\n{}\n;\n{}\n;\n{handlers}{}\n;\n{}\n;\n{main}{}\n;\n",
            tokens.open(Region::Declarations),
            tokens.close(Region::Declarations),
            tokens.open(Region::Handlers),
            tokens.close(Region::Handlers),
            tokens.open(Region::Main),
            tokens.close(Region::Main),
        )
    }

    #[test]
    fn test_compiled_fragments_replace_originals() {
        let src = concat!(
            r#"<button onclick="this.hidden = true as boolean">x</button>"#,
            "<script>let n: number = 1;</script>"
        );
        let mut doc = HtmlDocument::parse(src).unwrap();
        let tokens = BoundaryTokens::new();
        let decomposition = decompose(&doc, HandlerMode::Known);

        let handler = &decomposition.handlers[0];
        let AnnotationKind::Handler { accessor, .. } = &handler.annotation.kind else {
            unreachable!()
        };
        let handlers = format!(
            "{accessor}.onclick = function (event) {{\n    {accessor}.hidden = true;\n}};\n{}\n;\n",
            handler.annotation.encode().unwrap()
        );
        let main = format!(
            "let n = 1;\n{}\n;\n",
            decomposition.scripts[0].annotation.encode().unwrap()
        );

        reassemble(&compiled(&tokens, &handlers, &main), &tokens, &mut doc).unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<button onclick="this.hidden = true;">x</button><script>let n = 1;</script>"#
        );
    }

    #[test]
    fn test_unresolved_locator_is_partial() {
        let src = "<script>a()</script><script>b()</script>";
        let mut doc = HtmlDocument::parse(src).unwrap();
        let tokens = BoundaryTokens::new();
        let ghost = Annotation::script(Locator::parse("/div[9]").unwrap());
        let real = Annotation::script(Locator::parse("/script[2]").unwrap());
        let main = format!(
            "lost()\n{}\n;\nkept()\n{}\n;\n",
            ghost.encode().unwrap(),
            real.encode().unwrap()
        );

        let report = reassemble(&compiled(&tokens, "", &main), &tokens, &mut doc).unwrap();
        assert_eq!(report.scripts, 2);
        assert_eq!(report.unresolved.len(), 1);
        assert!(matches!(
            &report.unresolved[0],
            WeaveError::NodeNotFound { id, .. } if *id == ghost.id
        ));
        assert_eq!(doc.to_html(), "<script>a()</script><script>kept()</script>");
    }

    #[test]
    fn test_missing_region_fails() {
        let mut doc = HtmlDocument::parse("<p>x</p>").unwrap();
        let tokens = BoundaryTokens::new();
        let result = reassemble("let x = 1;\n", &tokens, &mut doc);
        assert!(matches!(
            result,
            Err(WeaveError::RegionNotFound {
                region: Region::Handlers
            })
        ));
    }

    #[test]
    fn test_import_containers_are_not_rewritten() {
        let src = r#"<script type="importmap">{"imports":{"sq":"./sq.js"}}</script>"#;
        let mut doc = HtmlDocument::parse(src).unwrap();
        let tokens = BoundaryTokens::new();
        let decomposition = decompose(&doc, HandlerMode::Known);
        let unit = assemble(&decomposition, &tokens, "").unwrap();
        assert_eq!(unit.matches("import { sq } from \"./sq.js\";").count(), 1);

        reassemble(&unit, &tokens, &mut doc).unwrap();
        assert_eq!(doc.edit_count(), 0);
        assert_eq!(doc.to_html(), src);
    }
}

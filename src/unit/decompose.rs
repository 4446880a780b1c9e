//! Document decomposition: identifiers, handlers and script containers.

use super::handlers::HandlerMode;
use super::import_map::{ImportMap, quote};
use super::selfref::{bind, make_accessor};
use super::{Decomposition, Fragment};
use crate::annotation::Annotation;
use crate::document::{HtmlDocument, NodeId};
use crate::utils::html::ScriptType;
use crate::{debug, log};
use rustc_hash::FxHashSet;
use uuid::Uuid;

/// Words that cannot name a `let` binding.
const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Extract every fragment of `doc`, in document order.
///
/// Reads only; the document is not modified.
pub fn decompose(doc: &HtmlDocument, mode: HandlerMode) -> Decomposition {
    let mut out = Decomposition::default();
    let mut declared = FxHashSet::default();
    let mut accessor_keys = FxHashSet::default();

    for id in doc.elements() {
        if let Some(decl) = declaration(doc, id, &mut declared) {
            out.declarations.push(decl);
        }

        let handler_names: Vec<String> = doc
            .attribute_names(id)
            .filter(|name| mode.matches(name))
            .map(str::to_string)
            .collect();
        for name in handler_names {
            let body = doc.attribute(id, &name).unwrap_or_default();
            let key = loop {
                let key = Uuid::new_v4().simple().to_string()[..8].to_string();
                if accessor_keys.insert(key.clone()) {
                    break key;
                }
            };
            let accessor = make_accessor(&key);
            let code = format!(
                "{accessor}.{name} = (event) => {{\n{}\n}};",
                bind(&body, &accessor)
            );
            out.handlers.push(Fragment {
                code,
                annotation: checked(Annotation::handler(doc.locator(id).clone(), name, accessor)),
            });
        }

        if doc.name(id) == "script"
            && let Some(code) = script_code(doc, id)
        {
            out.scripts.push(Fragment {
                code,
                annotation: checked(Annotation::script(doc.locator(id).clone())),
            });
        }
    }

    debug!(
        "unit";
        "{} declaration(s), {} handler(s), {} script(s)",
        out.declarations.len(),
        out.handlers.len(),
        out.scripts.len()
    );
    out
}

/// Debug builds check that every annotation survives its own encoding, so
/// reassembly can find the element again.
fn checked(annotation: Annotation) -> Annotation {
    debug_assert_eq!(
        annotation
            .encode()
            .ok()
            .and_then(|token| Annotation::try_decode(&token, annotation.tag())),
        Some(annotation.clone()),
        "annotation for {} does not round-trip",
        annotation.locator
    );
    annotation
}

fn declaration(
    doc: &HtmlDocument,
    id: NodeId,
    declared: &mut FxHashSet<String>,
) -> Option<String> {
    let value = doc.attribute(id, "id")?;
    if !is_identifier(&value) {
        if !value.is_empty() {
            debug!("unit"; "id `{}` at {} is not an identifier", value, doc.locator(id));
        }
        return None;
    }
    if !declared.insert(value.to_string()) {
        return None;
    }
    Some(format!("let {value} = document.getElementById('{value}')!;"))
}

/// Source text a script container contributes to the main region.
///
/// Data blocks (`application/ld+json`, `text/template`, ...) contribute
/// nothing and are left as they are.
fn script_code(doc: &HtmlDocument, id: NodeId) -> Option<String> {
    let ty = ScriptType::of(doc.attribute(id, "type").as_deref());
    if ty == ScriptType::Data {
        debug!("unit"; "script at {} is a data block", doc.locator(id));
        return None;
    }

    if let Some(src) = doc.attribute(id, "src").filter(|s| !s.trim().is_empty()) {
        return Some(format!("import {};", quote(src.trim())));
    }

    let inner = doc.inner(id);
    if ty == ScriptType::ImportMap {
        let imports = match ImportMap::parse(inner.unwrap_or_default()) {
            Ok(map) => map.to_imports(),
            Err(e) => {
                log!("warning"; "import map at {}: {}", doc.locator(id), e);
                String::new()
            }
        };
        return Some(imports);
    }

    match inner {
        Some(text) => Some(text.to_string()),
        None => {
            debug!("unit"; "script at {} has no content", doc.locator(id));
            None
        }
    }
}

/// Whether `name` can be declared with `let`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;

    fn decompose_str(src: &str) -> Decomposition {
        decompose(&HtmlDocument::parse(src).unwrap(), HandlerMode::Known)
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("box"));
        assert!(is_identifier("$el_2"));
        assert!(is_identifier("café"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("my-box"));
        assert!(!is_identifier("class"));
    }

    #[test]
    fn test_declarations_skip_invalid_and_duplicates() {
        let d = decompose_str(
            r#"<div id="box"></div><p id=""></p><p id="a-b"></p><i id="box"></i><b id="new"></b>"#,
        );
        assert_eq!(
            d.declarations,
            vec!["let box = document.getElementById('box')!;"]
        );
    }

    #[test]
    fn test_handler_fragment() {
        let d = decompose_str(r#"<button onclick="this.remove()" onfoo="x()">x</button>"#);
        assert_eq!(d.handlers.len(), 1);
        let fragment = &d.handlers[0];
        let AnnotationKind::Handler {
            attribute,
            accessor,
        } = &fragment.annotation.kind
        else {
            panic!("expected handler annotation");
        };
        assert_eq!(attribute, "onclick");
        assert!(accessor.starts_with("document.getElementById('__tshtml_"));
        assert_eq!(
            fragment.code,
            format!("{accessor}.onclick = (event) => {{\n{accessor}!.remove()\n}};")
        );
        assert_eq!(fragment.annotation.locator.as_str(), "/button[1]");
    }

    #[test]
    fn test_prefixed_mode_handlers() {
        let doc = HtmlDocument::parse(r#"<div onpointerdown="go()"></div>"#).unwrap();
        assert!(decompose(&doc, HandlerMode::Known).handlers.is_empty());
        assert_eq!(decompose(&doc, HandlerMode::Prefixed).handlers.len(), 1);
    }

    #[test]
    fn test_accessors_are_unique() {
        let d = decompose_str(r#"<a onclick="a()" onblur="b()">x</a><a onclick="c()">y</a>"#);
        let mut accessors: Vec<_> = d
            .handlers
            .iter()
            .map(|f| match &f.annotation.kind {
                AnnotationKind::Handler { accessor, .. } => accessor.clone(),
                AnnotationKind::Script => unreachable!(),
            })
            .collect();
        accessors.sort();
        accessors.dedup();
        assert_eq!(accessors.len(), 3);
    }

    #[test]
    fn test_script_forms() {
        let d = decompose_str(concat!(
            r#"<script src="lib.js"></script>"#,
            r#"<script type="importmap">{"imports":{"sq":"./sq.js"}}</script>"#,
            r#"<script type="importmap">{broken</script>"#,
            "<script>console.log(1)</script>",
        ));
        let codes: Vec<&str> = d.scripts.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "import \"lib.js\";",
                "import { sq } from \"./sq.js\";\n",
                "",
                "console.log(1)",
            ]
        );
        assert!(
            d.scripts
                .iter()
                .all(|f| f.annotation.kind == AnnotationKind::Script)
        );
    }

    #[test]
    fn test_data_blocks_are_skipped() {
        let d = decompose_str(concat!(
            r#"<script type="application/ld+json">{"@type": "Person"}</script>"#,
            r#"<script type="text/template"><p>${name}</p></script>"#,
            r#"<script type="module">export const a = 1;</script>"#,
            r#"<script type="importmap">{"x":"./x.js"}</script>"#,
        ));
        let codes: Vec<&str> = d.scripts.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["export const a = 1;", "import { x } from \"./x.js\";\n"]
        );
        assert_eq!(d.scripts[0].annotation.locator.as_str(), "/script[3]");
    }

    #[test]
    fn test_plain_document_is_empty() {
        let d = decompose_str("<p class=x>hello</p>");
        assert!(!d.has_fragments());
        assert!(d.declarations.is_empty());
    }
}

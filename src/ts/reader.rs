//! `.ts` document reader
//!
//! Parses the XML tree with `xmltree` and maps it onto the catalog model.
//! Any structural problem rejects the whole document.

use crate::catalog::{Catalog, Context, Location, Message, TranslationState, DEFAULT_TS_VERSION};
use crate::error::{CatalogError, CatalogResult};
use std::collections::HashMap;
use xmltree::{Element, ParserConfig, XMLNode};

/// Parse a `.ts` document held in memory
pub fn parse_str(xml: &str) -> CatalogResult<Catalog> {
    // Whitespace-only strings are content, not layout
    let config = ParserConfig::new()
        .trim_whitespace(false)
        .whitespace_to_characters(true);
    let root = Element::parse_with_config(xml.as_bytes(), config)
        .map_err(|e| CatalogError::Malformed(e.to_string()))?;

    if root.name != "TS" {
        return Err(CatalogError::UnexpectedRoot { found: root.name });
    }

    let mut catalog = Catalog::default();
    catalog.version = root
        .attributes
        .get("version")
        .cloned()
        .unwrap_or_else(|| DEFAULT_TS_VERSION.to_string());
    catalog.language = root.attributes.get("language").cloned();
    catalog.source_language = root.attributes.get("sourcelanguage").cloned();

    for el in child_elements(&root) {
        match el.name.as_str() {
            "context" => catalog.add_context(parse_context(el)?)?,
            other => log::debug!("Ignoring <{}> in <TS>", other),
        }
    }

    Ok(catalog)
}

fn parse_context(el: &Element) -> CatalogResult<Context> {
    let name = el
        .get_child("name")
        .map(element_text)
        .ok_or(CatalogError::MissingElement {
            element: "name",
            parent: "context",
        })?;

    let mut context = Context::new(name);
    let mut cursor = LocationCursor::default();

    for child in child_elements(el) {
        match child.name.as_str() {
            "message" => {
                let message = parse_message(child, &context.name, &mut cursor)?;
                context.messages.push(message);
            }
            "name" => {}
            other => log::debug!("Ignoring <{}> in context {}", other, context.name),
        }
    }

    Ok(context)
}

fn parse_message(
    el: &Element,
    context: &str,
    cursor: &mut LocationCursor,
) -> CatalogResult<Message> {
    let mut message = Message {
        id: el.attributes.get("id").cloned(),
        numerus: el.attributes.get("numerus").map(String::as_str) == Some("yes"),
        state: TranslationState::Unfinished,
        ..Message::default()
    };
    let mut has_source = false;

    for child in child_elements(el) {
        match child.name.as_str() {
            "location" => message.locations.push(cursor.resolve(child, context)?),
            "source" => {
                message.source = element_text(child);
                has_source = true;
            }
            "oldsource" => message.oldsource = Some(element_text(child)),
            "comment" => message.comment = Some(element_text(child)),
            "oldcomment" => message.oldcomment = Some(element_text(child)),
            "extracomment" => message.extracomment = Some(element_text(child)),
            "translatorcomment" => message.translatorcomment = Some(element_text(child)),
            "translation" => parse_translation(child, &mut message)?,
            other => log::debug!("Ignoring <{}> in message", other),
        }
    }

    if !has_source {
        return Err(CatalogError::MissingElement {
            element: "source",
            parent: "message",
        });
    }

    Ok(message)
}

fn parse_translation(el: &Element, message: &mut Message) -> CatalogResult<()> {
    let kind = el.attributes.get("type").map(String::as_str);
    message.state =
        TranslationState::from_attr(kind).ok_or_else(|| CatalogError::InvalidAttribute {
            element: "translation",
            attribute: "type",
            value: kind.unwrap_or_default().to_string(),
        })?;

    if message.numerus {
        message.numerus_forms = child_elements(el)
            .filter(|c| c.name == "numerusform")
            .map(element_text)
            .collect();
    } else {
        message.translation = element_text(el);
    }
    Ok(())
}

/// Tracks the last file and per-file line so relative locations
/// (`<location line="+3"/>`) resolve to absolute ones
#[derive(Default)]
struct LocationCursor {
    file: Option<String>,
    lines: HashMap<String, u32>,
}

impl LocationCursor {
    fn resolve(&mut self, el: &Element, context: &str) -> CatalogResult<Location> {
        let filename = match el.attributes.get("filename") {
            Some(name) => name.clone(),
            None => self
                .file
                .clone()
                .ok_or_else(|| CatalogError::DanglingLocation {
                    context: context.to_string(),
                })?,
        };

        let raw = el.attributes.get("line").map(String::as_str).unwrap_or("0");
        let invalid = || CatalogError::InvalidAttribute {
            element: "location",
            attribute: "line",
            value: raw.to_string(),
        };

        let line = if raw.starts_with('+') || raw.starts_with('-') {
            let delta: i64 = raw.parse().map_err(|_| invalid())?;
            let base = i64::from(self.lines.get(&filename).copied().unwrap_or(0));
            u32::try_from(base + delta).map_err(|_| invalid())?
        } else {
            raw.parse().map_err(|_| invalid())?
        };

        self.lines.insert(filename.clone(), line);
        self.file = Some(filename.clone());
        Ok(Location::new(filename, line))
    }
}

fn child_elements(el: &Element) -> impl Iterator<Item = &Element> {
    el.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

/// Concatenated character data of an element, with `<byte value="..."/>`
/// escapes decoded back into characters. Of `<lengthvariant>` children only
/// the first is kept.
fn element_text(el: &Element) -> String {
    let variants: Vec<&Element> = child_elements(el)
        .filter(|c| c.name == "lengthvariant")
        .collect();
    if let Some(first) = variants.first() {
        if variants.len() > 1 {
            log::warn!(
                "Keeping the first of {} length variants of <{}>, the rest are dropped",
                variants.len(),
                el.name
            );
        }
        return element_text(first);
    }

    let mut text = String::new();
    for node in &el.children {
        match node {
            XMLNode::Text(s) | XMLNode::CData(s) => text.push_str(s),
            XMLNode::Element(child) if child.name == "byte" => {
                if let Some(c) = child.attributes.get("value").and_then(|v| decode_byte(v)) {
                    text.push(c);
                }
            }
            _ => {}
        }
    }
    text
}

/// Decode a byte escape value: decimal (`27`) or hex (`x1b`, `0x1b`)
fn decode_byte(value: &str) -> Option<char> {
    let n = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix('x')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        value.parse().ok()?
    };
    char::from_u32(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../translations/XLSXEditor_zh_CN.ts");

    #[test]
    fn test_parse_fixture() {
        let catalog = parse_str(FIXTURE).unwrap();
        assert_eq!(catalog.version, "2.1");
        assert_eq!(catalog.language.as_deref(), Some("zh_CN"));

        let names: Vec<_> = catalog.contexts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["DataItem", "XLSXEditor"]);

        let warning = catalog
            .context("XLSXEditor")
            .and_then(|c| c.find("Warning", ""))
            .unwrap();
        assert_eq!(warning.translation, "警告");
        assert_eq!(
            warning.locations,
            vec![
                Location::new("../src/XLSXEditor.cpp", 161),
                Location::new("../src/XLSXEditor.cpp", 169),
            ]
        );
        assert_eq!(warning.state, TranslationState::Finished);
    }

    #[test]
    fn test_fixture_translations_non_empty() {
        let catalog = parse_str(FIXTURE).unwrap();
        for (_, message) in catalog.messages() {
            if !message.source.is_empty() {
                assert!(!message.translation.is_empty(), "{}", message.source);
            }
        }
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let err = parse_str("<TS><context><name>X</name>").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = parse_str("<ui version=\"4.0\"/>").unwrap_err();
        assert!(matches!(err, CatalogError::UnexpectedRoot { found } if found == "ui"));
    }

    #[test]
    fn test_missing_parts_rejected() {
        let err = parse_str("<TS><context><message/></context></TS>").unwrap_err();
        assert!(matches!(err, CatalogError::MissingElement { element: "name", .. }));

        let err = parse_str("<TS><context><name>A</name><message><translation>x</translation></message></context></TS>")
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingElement { element: "source", .. }));
    }

    #[test]
    fn test_duplicate_context_rejected() {
        let xml = "<TS><context><name>A</name></context><context><name>A</name></context></TS>";
        assert!(matches!(
            parse_str(xml).unwrap_err(),
            CatalogError::DuplicateContext { .. }
        ));
    }

    #[test]
    fn test_relative_locations() {
        let xml = r#"<TS version="2.1" language="zh_CN"><context><name>A</name>
            <message><location filename="a.cpp" line="10"/><location line="+5"/><source>x</source><translation>y</translation></message>
            <message><location line="-3"/><source>z</source><translation>w</translation></message>
        </context></TS>"#;
        let catalog = parse_str(xml).unwrap();
        let ctx = catalog.context("A").unwrap();
        assert_eq!(ctx.messages[0].locations[1], Location::new("a.cpp", 15));
        assert_eq!(ctx.messages[1].locations[0], Location::new("a.cpp", 12));
    }

    #[test]
    fn test_dangling_and_invalid_locations() {
        let xml = r#"<TS><context><name>A</name><message><location line="+1"/><source>x</source></message></context></TS>"#;
        assert!(matches!(
            parse_str(xml).unwrap_err(),
            CatalogError::DanglingLocation { .. }
        ));

        let xml = r#"<TS><context><name>A</name><message><location filename="a" line="ten"/><source>x</source></message></context></TS>"#;
        assert!(matches!(
            parse_str(xml).unwrap_err(),
            CatalogError::InvalidAttribute { attribute: "line", .. }
        ));
    }

    #[test]
    fn test_states_numerus_and_bytes() {
        let xml = r#"<TS language="ru"><context><name>A</name>
            <message numerus="yes"><source>%n row(s)</source>
                <translation type="unfinished"><numerusform>%n строка</numerusform><numerusform>%n строки</numerusform><numerusform>%n строк</numerusform></translation>
            </message>
            <message><source>Esc<byte value="x1b"/></source><comment>key</comment><translation type="vanished">Выход</translation></message>
        </context></TS>"#;
        let catalog = parse_str(xml).unwrap();
        let ctx = catalog.context("A").unwrap();
        assert!(ctx.messages[0].numerus);
        assert_eq!(ctx.messages[0].numerus_forms.len(), 3);
        assert_eq!(ctx.messages[0].state, TranslationState::Unfinished);
        assert_eq!(ctx.messages[1].source, "Esc\u{1b}");
        assert_eq!(ctx.messages[1].comment.as_deref(), Some("key"));
        assert_eq!(ctx.messages[1].state, TranslationState::Vanished);
    }

    #[test]
    fn test_whitespace_only_strings_kept() {
        let xml = "<TS><context><name>A</name>\n    <message>\n        <source> </source>\n        <comment>  </comment>\n        <translation> </translation>\n    </message>\n</context></TS>";
        let catalog = parse_str(xml).unwrap();
        let message = &catalog.context("A").unwrap().messages[0];
        assert_eq!(message.source, " ");
        assert_eq!(message.comment.as_deref(), Some("  "));
        assert_eq!(message.translation, " ");
        assert_eq!(message.state, TranslationState::Finished);
    }

    #[test]
    fn test_first_length_variant_kept() {
        let xml = r#"<TS><context><name>A</name><message><source>Open file</source>
            <translation variants="yes">
                <lengthvariant>打开文件</lengthvariant>
                <lengthvariant>打开</lengthvariant>
            </translation></message></context></TS>"#;
        let catalog = parse_str(xml).unwrap();
        assert_eq!(catalog.context("A").unwrap().messages[0].translation, "打开文件");
    }

    #[test]
    fn test_unknown_translation_type_rejected() {
        let xml = r#"<TS><context><name>A</name><message><source>x</source><translation type="done">y</translation></message></context></TS>"#;
        assert!(matches!(
            parse_str(xml).unwrap_err(),
            CatalogError::InvalidAttribute { attribute: "type", .. }
        ));
    }
}

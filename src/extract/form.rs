//! String extraction from Qt Designer `.ui` forms
//!
//! Streams the form with `xml-rs` so each `<string>` keeps its line number.
//! The form's `<class>` names the context.

use super::Extracted;
use crate::error::{ExtractError, ExtractResult};
use std::path::Path;
use xml::common::Position;
use xml::reader::{EventReader, XmlEvent};

/// A `<string>` being collected
struct PendingString {
    line: u32,
    text: String,
    comment: Option<String>,
    extracomment: Option<String>,
}

/// Extract translatable strings from form XML. `path` is only used for
/// error reporting.
pub fn extract(xml: &str, path: &Path) -> ExtractResult<Vec<Extracted>> {
    let mut reader = EventReader::new(xml.as_bytes());
    let mut depth = 0usize;
    let mut class_name: Option<String> = None;
    let mut in_class = false;
    let mut pending: Option<PendingString> = None;
    let mut strings = Vec::new();

    loop {
        let event = reader.next().map_err(|e| ExtractError::FormParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        match event {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                depth += 1;
                let attr = |key: &str| {
                    attributes
                        .iter()
                        .find(|a| a.name.local_name == key)
                        .map(|a| a.value.clone())
                };
                match name.local_name.as_str() {
                    "class" if depth == 2 && class_name.is_none() => in_class = true,
                    "string" if attr("notr").as_deref() != Some("true") => {
                        pending = Some(PendingString {
                            line: reader.position().row as u32 + 1,
                            text: String::new(),
                            comment: attr("comment").filter(|c| !c.is_empty()),
                            extracomment: attr("extracomment").filter(|c| !c.is_empty()),
                        });
                    }
                    _ => {}
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if in_class {
                    class_name.get_or_insert_with(String::new).push_str(text.trim());
                } else if let Some(pending) = pending.as_mut() {
                    pending.text.push_str(&text);
                }
            }
            XmlEvent::EndElement { name } => {
                depth = depth.saturating_sub(1);
                match name.local_name.as_str() {
                    "class" => in_class = false,
                    "string" => {
                        if let Some(done) = pending.take().filter(|p| !p.text.is_empty()) {
                            strings.push(done);
                        }
                    }
                    _ => {}
                }
            }
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }

    let context = class_name
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ExtractError::MissingFormClass {
            path: path.to_path_buf(),
        })?;

    Ok(strings
        .into_iter()
        .map(|s| Extracted {
            context: context.clone(),
            source: s.text,
            comment: s.comment,
            extracomment: s.extracomment,
            numerus: false,
            line: s.line,
        })
        .collect())
}

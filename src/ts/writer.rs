//! `.ts` document writer
//!
//! Emits the layout Qt Linguist tools produce: XML declaration, `<!DOCTYPE TS>`,
//! unindented contexts, 4-space nested elements and absolute locations.

use crate::catalog::{Catalog, Context, Message};
use std::borrow::Cow;
use std::fmt::{self, Write};
use xml::escape::{escape_str_attribute, escape_str_pcdata};

const INDENT: &str = "    ";

/// Serialize a catalog to a `.ts` document
pub fn to_string(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(256 + catalog.message_count() * 256);
    // Writing into a String cannot fail
    let _ = write_catalog(&mut out, catalog);
    out
}

/// Serialize a catalog into any formatter sink
pub fn write_catalog<W: Write>(out: &mut W, catalog: &Catalog) -> fmt::Result {
    out.write_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n")?;

    write!(out, "<TS version=\"{}\"", escape_str_attribute(&catalog.version))?;
    if let Some(language) = &catalog.language {
        write!(out, " language=\"{}\"", escape_str_attribute(language))?;
    }
    if let Some(source_language) = &catalog.source_language {
        write!(out, " sourcelanguage=\"{}\"", escape_str_attribute(source_language))?;
    }
    out.write_str(">\n")?;

    for context in catalog.contexts() {
        write_context(out, context)?;
    }

    out.write_str("</TS>\n")
}

fn write_context<W: Write>(out: &mut W, context: &Context) -> fmt::Result {
    out.write_str("<context>\n")?;
    write_element(out, 1, "name", &context.name)?;
    for message in &context.messages {
        write_message(out, message)?;
    }
    out.write_str("</context>\n")
}

fn write_message<W: Write>(out: &mut W, message: &Message) -> fmt::Result {
    write!(out, "{}<message", INDENT)?;
    if let Some(id) = &message.id {
        write!(out, " id=\"{}\"", escape_str_attribute(id))?;
    }
    if message.numerus {
        out.write_str(" numerus=\"yes\"")?;
    }
    out.write_str(">\n")?;

    for location in &message.locations {
        writeln!(
            out,
            "{0}{0}<location filename=\"{1}\" line=\"{2}\"/>",
            INDENT,
            escape_str_attribute(&location.filename),
            location.line
        )?;
    }

    write_element(out, 2, "source", &message.source)?;
    let optional = [
        ("oldsource", &message.oldsource),
        ("comment", &message.comment),
        ("oldcomment", &message.oldcomment),
        ("extracomment", &message.extracomment),
        ("translatorcomment", &message.translatorcomment),
    ];
    for (tag, value) in optional {
        if let Some(value) = value {
            write_element(out, 2, tag, value)?;
        }
    }

    write!(out, "{0}{0}<translation", INDENT)?;
    if let Some(kind) = message.state.as_attr() {
        write!(out, " type=\"{}\"", kind)?;
    }
    if message.numerus {
        out.write_str(">\n")?;
        for form in &message.numerus_forms {
            write_element(out, 3, "numerusform", form)?;
        }
        writeln!(out, "{0}{0}</translation>", INDENT)?;
    } else {
        out.write_str(">")?;
        write_text(out, &message.translation)?;
        out.write_str("</translation>\n")?;
    }

    writeln!(out, "{}</message>", INDENT)
}

fn write_element<W: Write>(out: &mut W, depth: usize, tag: &str, text: &str) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    write!(out, "<{}>", tag)?;
    write_text(out, text)?;
    writeln!(out, "</{}>", tag)
}

/// Escape character data; control characters XML cannot carry become
/// `<byte value="xNN"/>` elements
fn write_text<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    let mut rest = text;
    while let Some(pos) = rest.find(is_unrepresentable) {
        out.write_str(&protect(&rest[..pos]))?;
        let c = rest[pos..].chars().next().unwrap_or_default();
        write!(out, "<byte value=\"x{:x}\"/>", c as u32)?;
        rest = &rest[pos + c.len_utf8()..];
    }
    out.write_str(&protect(rest))
}

/// Escape markup characters, quotes included as Qt's writer does
fn protect(text: &str) -> Cow<'_, str> {
    let escaped = escape_str_pcdata(text);
    if escaped.contains(['"', '\'']) {
        Cow::Owned(escaped.replace('"', "&quot;").replace('\'', "&apos;"))
    } else {
        escaped
    }
}

fn is_unrepresentable(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Location, TranslationState};
    use crate::ts::parse_str;

    const FIXTURE: &str = include_str!("../../translations/XLSXEditor_zh_CN.ts");

    #[test]
    fn test_fixture_round_trips_exactly() {
        let catalog = parse_str(FIXTURE).unwrap();
        assert_eq!(to_string(&catalog), FIXTURE);
    }

    #[test]
    fn test_round_trip_preserves_tuples() {
        let catalog = parse_str(FIXTURE).unwrap();
        let reparsed = parse_str(&to_string(&catalog)).unwrap();

        let tuples = |c: &Catalog| -> Vec<(String, String, String, Vec<Location>)> {
            c.messages()
                .map(|(ctx, m)| {
                    (
                        ctx.to_string(),
                        m.source.clone(),
                        m.translation.clone(),
                        m.locations.clone(),
                    )
                })
                .collect()
        };
        assert_eq!(tuples(&catalog), tuples(&reparsed));
        assert_eq!(catalog, reparsed);
    }

    #[test]
    fn test_whitespace_strings_round_trip() {
        let mut catalog = Catalog::new("zh_CN");
        catalog
            .add_context(
                Context::new("Table")
                    .with_message(Message::new(" ", " ").with_location("a.cpp", 1))
                    .with_message(Message::new("Rows: ", "  行数").with_location("a.cpp", 2))
                    .with_message(Message::new("line\n", "行\n").with_comment(" ")),
            )
            .unwrap();

        assert_eq!(parse_str(&to_string(&catalog)).unwrap(), catalog);
    }

    #[test]
    fn test_quotes_written_as_entities() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"de\">\n<context>\n    <name>A</name>\n    <message>\n        <source>Don&apos;t &quot;save&quot;</source>\n        <translation>Nicht &quot;speichern&quot;</translation>\n    </message>\n</context>\n</TS>\n";
        let catalog = parse_str(xml).unwrap();
        assert_eq!(catalog.context("A").unwrap().messages[0].source, "Don't \"save\"");
        assert_eq!(to_string(&catalog), xml);
    }

    #[test]
    fn test_escaping_and_optional_elements() {
        let mut msg = Message::new("Rows < 10 & \"quoted\"", "行 < 10")
            .with_location("../src/a.cpp", 3)
            .with_comment("table");
        msg.id = Some("rows.small".to_string());
        msg.extracomment = Some("shown in status bar".to_string());
        msg.state = TranslationState::Unfinished;

        let mut plural = Message::new("%n item(s)", "");
        plural.numerus = true;
        plural.numerus_forms = vec!["%n 项".to_string()];

        let mut catalog = Catalog::new("zh_CN");
        catalog.source_language = Some("en".to_string());
        catalog
            .add_context(
                Context::new("Table")
                    .with_message(msg)
                    .with_message(plural)
                    .with_message(Message::new("Tab\u{1}", "x")),
            )
            .unwrap();

        let xml = to_string(&catalog);
        assert!(xml.contains("<TS version=\"2.1\" language=\"zh_CN\" sourcelanguage=\"en\">"));
        assert!(xml.contains("<message id=\"rows.small\">"));
        assert!(xml.contains("&lt; 10 &amp;"));
        assert!(xml.contains("        <comment>table</comment>\n        <extracomment>"));
        assert!(xml.contains("<translation type=\"unfinished\">"));
        assert!(xml.contains(
            "        <translation>\n            <numerusform>%n 项</numerusform>\n        </translation>"
        ));
        assert!(xml.contains("<source>Tab<byte value=\"x1\"/></source>"));

        assert_eq!(parse_str(&xml).unwrap(), catalog);
    }
}

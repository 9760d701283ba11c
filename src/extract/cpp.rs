//! String extraction from C++ sources
//!
//! Comments are masked out first (keeping byte offsets), then a single scan
//! tracks which class or member-function body each offset belongs to so
//! `tr()` calls can be attributed to their context.

use super::Extracted;
use crate::utils::text::{line_of, line_starts};
use regex::Regex;
use std::sync::OnceLock;

/// One or more adjacent string literals
const LITERALS: &str = r#""(?:[^"\\\n]|\\.)*"(?:\s*"(?:[^"\\\n]|\\.)*")*"#;

fn tr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?:\b(?P<class>[A-Za-z_]\w*)\s*::\s*)?\b(?:tr|trUtf8|QT_TR_NOOP|QT_TR_N_NOOP)\s*\(\s*(?P<source>{lit})(?:\s*,\s*(?P<comment>{lit}|nullptr|NULL|0)(?P<count>\s*,\s*[^)\s])?)?",
            lit = LITERALS
        );
        Regex::new(&pattern).expect("valid tr() regex")
    })
}

fn translate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?:\b(?:QCoreApplication|QApplication|QGuiApplication)\s*::\s*translate|\bQT_TRANSLATE_NOOP3?|\bQT_TRANSLATE_N_NOOP)\s*\(\s*(?P<context>{lit})\s*,\s*(?P<source>{lit})(?:\s*,\s*(?P<comment>{lit}|nullptr|NULL|0)(?P<count>\s*,\s*[^)\s])?)?",
            lit = LITERALS
        );
        Regex::new(&pattern).expect("valid translate() regex")
    })
}

fn literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""((?:[^"\\\n]|\\.)*)""#).expect("valid literal regex"))
}

fn class_head_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:class|struct)\s+(?:[A-Z][A-Z0-9_]*\s+)?([A-Za-z_]\w*)\s*(?:final\s*)?(?::[^{;]*)?$")
            .expect("valid class regex")
    })
}

fn definition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_]\w*)\s*::\s*~?[A-Za-z_]\w*\s*\(").expect("valid definition regex")
    })
}

fn namespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:\bnamespace\b[^{]*|\bextern\s*"C")\s*$"#).expect("valid namespace regex")
    })
}

/// Extract translatable strings from C++ source text
pub fn extract(text: &str) -> Vec<Extracted> {
    let masked = mask_comments(text);
    let scopes = ScopeMap::build(&masked);
    let lines = line_starts(&masked);
    let mut found = Vec::new();

    for caps in tr_regex().captures_iter(&masked) {
        let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let explicit = caps.name("class").map(|m| m.as_str().to_string());
        let context = explicit.or_else(|| scopes.context_at(whole).map(str::to_string));
        let Some(context) = context else {
            log::warn!(
                "tr() outside of a class at line {}, skipped",
                line_of(&lines, whole)
            );
            continue;
        };

        found.push(Extracted {
            context,
            source: caps.name("source").map(|m| decode_literals(m.as_str())).unwrap_or_default(),
            comment: caps.name("comment").and_then(|m| literal_comment(m.as_str())),
            extracomment: None,
            numerus: caps.name("count").is_some(),
            line: line_of(&lines, whole),
        });
    }

    for caps in translate_regex().captures_iter(&masked) {
        let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
        found.push(Extracted {
            context: caps.name("context").map(|m| decode_literals(m.as_str())).unwrap_or_default(),
            source: caps.name("source").map(|m| decode_literals(m.as_str())).unwrap_or_default(),
            comment: caps.name("comment").and_then(|m| literal_comment(m.as_str())),
            extracomment: None,
            numerus: caps.name("count").is_some(),
            line: line_of(&lines, whole),
        });
    }

    found.sort_by_key(|e| e.line);
    found
}

/// Disambiguation argument, `None` for null pointers and empty strings
fn literal_comment(arg: &str) -> Option<String> {
    if !arg.starts_with('"') {
        return None;
    }
    Some(decode_literals(arg)).filter(|s| !s.is_empty())
}

/// Concatenate adjacent string literals and decode C escapes
pub fn decode_literals(literals: &str) -> String {
    let mut out = String::new();
    for caps in literal_regex().captures_iter(literals) {
        unescape_into(&caps[1], &mut out);
    }
    out
}

fn unescape_into(body: &str, out: &mut String) {
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            'x' => {
                let mut value = 0u32;
                while let Some(d) = chars.peek().and_then(|d| d.to_digit(16)) {
                    value = value * 16 + d;
                    chars.next();
                }
                out.extend(char::from_u32(value));
            }
            'u' | 'U' => {
                let width = if esc == 'u' { 4 } else { 8 };
                let mut value = 0u32;
                for _ in 0..width {
                    match chars.peek().and_then(|d| d.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            other => out.push(other),
        }
    }
}

/// Replace comment bytes with spaces, keeping newlines and offsets intact
fn mask_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_quoted(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                for b in &mut out[i..end] {
                    if *b != b'\n' {
                        *b = b' ';
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    // Comments are blanked byte for byte, so multi-byte characters vanish whole
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Index just past the closing quote of the literal starting at `start`
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[derive(Debug, Clone)]
enum Scope {
    Namespace,
    Class(String),
    /// Member function body; holds the owning class
    Function(String),
    Block,
}

/// Which class a given byte offset belongs to
struct ScopeMap {
    /// (offset, innermost class at that offset), sorted by offset
    changes: Vec<(usize, Option<String>)>,
}

impl ScopeMap {
    fn build(masked: &str) -> Self {
        let bytes = masked.as_bytes();
        let mut stack: Vec<Scope> = Vec::new();
        let mut changes = vec![(0, None)];
        let mut head_start = 0;
        let mut i = 0;
        let mut at_line_start = true;

        while i < bytes.len() {
            let b = bytes[i];
            if at_line_start && b == b'#' {
                // Preprocessor directive, honoring line continuations
                while i < bytes.len() && !(bytes[i] == b'\n' && bytes[i - 1] != b'\\') {
                    i += 1;
                }
                head_start = i;
                continue;
            }
            if b == b'\n' {
                at_line_start = true;
                i += 1;
                continue;
            }
            if !b.is_ascii_whitespace() {
                at_line_start = false;
            }

            match b {
                b'"' | b'\'' => {
                    i = skip_quoted(bytes, i);
                    continue;
                }
                b'{' => {
                    let head = &masked[head_start..i];
                    let scope = Self::classify(head, &stack);
                    stack.push(scope);
                    changes.push((i, Self::current(&stack)));
                    head_start = i + 1;
                }
                b'}' => {
                    stack.pop();
                    changes.push((i, Self::current(&stack)));
                    head_start = i + 1;
                }
                b';' => head_start = i + 1,
                _ => {}
            }
            i += 1;
        }

        Self { changes }
    }

    fn classify(head: &str, stack: &[Scope]) -> Scope {
        let in_code = stack
            .iter()
            .any(|s| matches!(s, Scope::Function(_) | Scope::Block));
        if in_code {
            return Scope::Block;
        }
        let head = head.trim_end();
        if namespace_regex().is_match(head) {
            return Scope::Namespace;
        }
        if let Some(caps) = class_head_regex().captures(head) {
            return Scope::Class(caps[1].to_string());
        }
        if let Some(caps) = definition_regex().captures(head) {
            return Scope::Function(caps[1].to_string());
        }
        // Inline member function inside a class body
        let looks_like_function =
            head.ends_with(')') || head.ends_with("override") || head.contains(") const");
        if looks_like_function {
            let class = stack.iter().rev().find_map(|s| match s {
                Scope::Class(name) => Some(name),
                _ => None,
            });
            if let Some(name) = class {
                return Scope::Function(name.clone());
            }
        }
        Scope::Block
    }

    fn current(stack: &[Scope]) -> Option<String> {
        stack.iter().rev().find_map(|s| match s {
            Scope::Class(name) | Scope::Function(name) => Some(name.clone()),
            Scope::Namespace | Scope::Block => None,
        })
    }

    fn context_at(&self, offset: usize) -> Option<&str> {
        let idx = self.changes.partition_point(|(at, _)| *at <= offset);
        self.changes
            .get(idx.saturating_sub(1))
            .and_then(|(_, ctx)| ctx.as_deref())
    }
}

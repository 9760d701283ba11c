//! Runtime lookup over a loaded catalog
//!
//! # Invariants
//!
//! 1. **Lookups never fail**: a key without a usable translation resolves to
//!    its source text.
//! 2. **Read-only**: a `Translator` is immutable after construction and is
//!    `Send + Sync`.
//! 3. **Inactive entries are invisible**: vanished and obsolete messages are
//!    never returned.

use super::{Catalog, Message, PluralRule, TranslationState};
use crate::config::LookupConfig;
use regex::Regex;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Source text -> indices of messages with that source (one per disambiguation)
type ContextIndex = HashMap<String, Vec<usize>>;

/// Indexed, immutable view of a catalog used to translate strings
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Catalog,
    /// Context name -> (context position, source index)
    index: HashMap<String, (usize, ContextIndex)>,
    plural_rule: PluralRule,
    options: LookupConfig,
}

impl Translator {
    /// Build a translator with default lookup options
    pub fn new(catalog: Catalog) -> Self {
        Self::with_options(catalog, LookupConfig::default())
    }

    pub fn with_options(catalog: Catalog, options: LookupConfig) -> Self {
        let mut index = HashMap::with_capacity(catalog.contexts().len());
        for (ctx_pos, context) in catalog.contexts().iter().enumerate() {
            let mut sources: ContextIndex = HashMap::with_capacity(context.messages.len());
            for (msg_pos, message) in context.messages.iter().enumerate() {
                sources
                    .entry(message.source.clone())
                    .or_default()
                    .push(msg_pos);
            }
            index.insert(context.name.clone(), (ctx_pos, sources));
        }

        let plural_rule = catalog
            .language
            .as_deref()
            .map(PluralRule::for_language)
            .unwrap_or(PluralRule::OneOther);

        log::debug!(
            "Indexed {} contexts ({} messages) for lookup",
            catalog.contexts().len(),
            catalog.message_count()
        );

        Self {
            catalog,
            index,
            plural_rule,
            options,
        }
    }

    /// The underlying catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Plural rule of the catalog language
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// Translate `source` in `context`, returning the source text when no
    /// translation is available
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.translate(context, source, None)
    }

    /// Translate with an optional disambiguation comment
    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguation: Option<&str>,
    ) -> &'a str {
        self.find(context, source, disambiguation).unwrap_or(source)
    }

    /// Resolve a translation without falling back to the source text.
    ///
    /// A disambiguated key that is not found is retried without its
    /// disambiguation.
    pub fn find(&self, context: &str, source: &str, disambiguation: Option<&str>) -> Option<&str> {
        let message = self.find_message(context, source, disambiguation)?;
        if message.numerus {
            message
                .numerus_forms
                .first()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
        } else {
            Some(message.translation.as_str())
        }
    }

    /// Translate a numerus message for count `n`, replacing `%n`
    pub fn translate_n(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        n: i64,
    ) -> String {
        let template = match self.find_message(context, source, disambiguation) {
            Some(message) if message.numerus => message
                .numerus_forms
                .get(self.plural_rule.form_index(n))
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(source),
            Some(message) => message.translation.as_str(),
            None => source,
        };
        template.replace("%n", &n.to_string())
    }

    fn find_message(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&Message> {
        let (ctx_pos, sources) = self.index.get(context)?;
        let candidates = sources.get(source)?;
        let messages = &self.catalog.contexts()[*ctx_pos].messages;

        let pick = |comment: &str| {
            candidates
                .iter()
                .map(|&i| &messages[i])
                .find(|m| m.disambiguation() == comment && self.is_usable(m))
        };

        match disambiguation.filter(|d| !d.is_empty()) {
            Some(comment) => pick(comment).or_else(|| pick("")),
            None => pick(""),
        }
    }

    fn is_usable(&self, message: &Message) -> bool {
        let state_ok = match message.state {
            TranslationState::Finished => true,
            TranslationState::Unfinished => self.options.include_unfinished,
            TranslationState::Vanished | TranslationState::Obsolete => false,
        };
        state_ok && message.has_translation()
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%([1-9][0-9]?)").expect("valid placeholder regex"))
}

/// Placeholder numbers (`%1`..`%99`) used in a string
pub fn placeholders(text: &str) -> BTreeSet<u32> {
    placeholder_regex()
        .captures_iter(text)
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

/// Substitute `%N` placeholders the way Qt's multi-argument `arg` does: the
/// lowest-numbered placeholder takes the first argument, the next lowest the
/// second, and so on. Placeholders without an argument are left as-is.
pub fn fill_args<'a>(template: &'a str, args: &[&str]) -> Cow<'a, str> {
    if args.is_empty() {
        return Cow::Borrowed(template);
    }

    let numbers: Vec<u32> = placeholders(template).into_iter().collect();
    let mapping: HashMap<u32, &str> = numbers
        .into_iter()
        .zip(args.iter().copied())
        .collect();

    placeholder_regex().replace_all(template, |caps: &regex::Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(|n| mapping.get(&n))
            .map(|s| s.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Context, Message};

    fn sample() -> Translator {
        let mut unfinished = Message::new("Restore", "恢复");
        unfinished.state = TranslationState::Unfinished;
        let mut vanished = Message::new("Old", "旧");
        vanished.state = TranslationState::Vanished;
        let mut files = Message::new("%n file(s)", "");
        files.numerus = true;
        files.numerus_forms = vec!["%n 个文件".to_string()];

        let catalog = Catalog::new("zh_CN")
            .with_context(
                Context::new("XLSXEditor")
                    .with_message(Message::new("Save", "保存"))
                    .with_message(Message::new("Open", "打开文件").with_comment("menu"))
                    .with_message(Message::new("Open", "打开"))
                    .with_message(Message::new("Empty", ""))
                    .with_message(unfinished)
                    .with_message(vanished)
                    .with_message(files),
            )
            .unwrap();
        Translator::new(catalog)
    }

    #[test]
    fn test_lookup_known_key() {
        let tr = sample();
        assert_eq!(tr.lookup("XLSXEditor", "Save"), "保存");
    }

    #[test]
    fn test_lookup_bundled_catalog() {
        let catalog =
            crate::ts::parse_str(include_str!("../../translations/XLSXEditor_zh_CN.ts")).unwrap();
        let warning = catalog.context("XLSXEditor").unwrap().find("Warning", "").unwrap();
        let lines: Vec<u32> = warning.locations.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![161, 169]);

        let tr = Translator::new(catalog);
        assert_eq!(tr.lookup("XLSXEditor", "Save"), "保存");
        assert_eq!(tr.lookup("XLSXEditor", "Warning"), "警告");
        assert_eq!(tr.lookup("DataItem", "Warning"), "Warning");
    }

    #[test]
    fn test_lookup_falls_back_to_source() {
        let tr = sample();
        assert_eq!(tr.lookup("XLSXEditor", "Quit"), "Quit");
        assert_eq!(tr.lookup("Nope", "Save"), "Save");
        assert_eq!(tr.lookup("XLSXEditor", "Empty"), "Empty");
        assert_eq!(tr.lookup("XLSXEditor", "Old"), "Old");
    }

    #[test]
    fn test_disambiguation_and_retry() {
        let tr = sample();
        assert_eq!(tr.translate("XLSXEditor", "Open", Some("menu")), "打开文件");
        assert_eq!(tr.translate("XLSXEditor", "Open", None), "打开");
        assert_eq!(tr.translate("XLSXEditor", "Open", Some("toolbar")), "打开");
        assert_eq!(tr.find("XLSXEditor", "Save", Some("x")), Some("保存"));
    }

    #[test]
    fn test_unfinished_respects_options() {
        let tr = sample();
        assert_eq!(tr.lookup("XLSXEditor", "Restore"), "恢复");

        let strict = Translator::with_options(
            tr.catalog().clone(),
            LookupConfig {
                include_unfinished: false,
            },
        );
        assert_eq!(strict.lookup("XLSXEditor", "Restore"), "Restore");
    }

    #[test]
    fn test_translate_n() {
        let tr = sample();
        assert_eq!(tr.translate_n("XLSXEditor", "%n file(s)", None, 3), "3 个文件");
        assert_eq!(tr.translate_n("XLSXEditor", "%n row(s)", None, 1), "1 row(s)");
    }

    #[test]
    fn test_fill_args() {
        assert_eq!(fill_args("从%1加载图片失败", &["a.png"]), "从a.png加载图片失败");
        assert_eq!(fill_args("%2 then %5", &["x", "y"]), "x then y");
        assert_eq!(fill_args("%1 and %2", &["only"]), "only and %2");
        assert_eq!(fill_args("100%", &["x"]), "100%");
    }

    #[test]
    fn test_translator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
    }
}

//! Catalog data model
//!
//! A catalog is an ordered list of contexts, each owning an ordered list of
//! messages. Messages carry their source text, translation and the source
//! locations the string was extracted from.

pub mod lookup;
pub mod plural;
pub mod stats;
pub mod validate;

pub use lookup::*;
pub use plural::*;
pub use stats::*;
pub use validate::*;

use crate::error::{CatalogError, CatalogResult};
use std::fmt;

/// Document format version written by current Qt Linguist tooling
pub const DEFAULT_TS_VERSION: &str = "2.1";

/// State of a message's translation, stored in the `type` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationState {
    /// Translated and reviewed (no `type` attribute)
    #[default]
    Finished,
    /// Not yet translated or not yet reviewed
    Unfinished,
    /// Source string no longer present in the application
    Vanished,
    /// Legacy spelling of vanished
    Obsolete,
}

impl TranslationState {
    /// Value of the `type` attribute, `None` for finished messages
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            TranslationState::Finished => None,
            TranslationState::Unfinished => Some("unfinished"),
            TranslationState::Vanished => Some("vanished"),
            TranslationState::Obsolete => Some("obsolete"),
        }
    }

    /// Parse a `type` attribute value
    pub fn from_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("") => Some(TranslationState::Finished),
            Some("unfinished") => Some(TranslationState::Unfinished),
            Some("vanished") => Some(TranslationState::Vanished),
            Some("obsolete") => Some(TranslationState::Obsolete),
            Some(_) => None,
        }
    }

    /// Whether the source string is still in use
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TranslationState::Finished | TranslationState::Unfinished
        )
    }
}

/// Where a message's source string appears in the application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// File path as written in the catalog (usually relative to it)
    pub filename: String,
    /// 1-based line number
    pub line: u32,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// One source string and its translation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Optional stable identifier (`id` attribute)
    pub id: Option<String>,
    /// Places in the application using this string
    pub locations: Vec<Location>,
    /// Original-language text, the lookup key
    pub source: String,
    /// Source text before the last update, if it changed
    pub oldsource: Option<String>,
    /// Disambiguation, part of the lookup key
    pub comment: Option<String>,
    pub oldcomment: Option<String>,
    /// Developer note for translators
    pub extracomment: Option<String>,
    /// Translator's own note
    pub translatorcomment: Option<String>,
    /// Localized text for non-numerus messages
    pub translation: String,
    pub state: TranslationState,
    /// Whether the message has plural forms
    pub numerus: bool,
    /// Localized plural forms, used when `numerus` is set
    pub numerus_forms: Vec<String>,
}

impl Message {
    /// Create a finished message
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            ..Self::default()
        }
    }

    /// Create an untranslated message as the extractor produces it
    pub fn unfinished(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            state: TranslationState::Unfinished,
            ..Self::default()
        }
    }

    /// Builder: add a location
    pub fn with_location(mut self, filename: impl Into<String>, line: u32) -> Self {
        self.locations.push(Location::new(filename, line));
        self
    }

    /// Builder: set the disambiguation comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Disambiguation as a plain string (empty when absent)
    pub fn disambiguation(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// Whether this message answers to the given key
    pub fn matches(&self, source: &str, disambiguation: &str) -> bool {
        self.source == source && self.disambiguation() == disambiguation
    }

    /// Whether any translation text is present
    pub fn has_translation(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().any(|f| !f.is_empty())
        } else {
            !self.translation.is_empty()
        }
    }
}

/// A named group of messages, usually one UI class
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    /// Builder: append a message
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Find a message by its key
    pub fn find(&self, source: &str, disambiguation: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.matches(source, disambiguation))
    }

    pub fn find_mut(&mut self, source: &str, disambiguation: &str) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.matches(source, disambiguation))
    }
}

/// A complete translation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Format version (`version` attribute)
    pub version: String,
    /// Target language, e.g. `zh_CN`
    pub language: Option<String>,
    /// Language of the source strings
    pub source_language: Option<String>,
    contexts: Vec<Context>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            version: DEFAULT_TS_VERSION.to_string(),
            language: None,
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

impl Catalog {
    /// Create an empty catalog for a target language
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    /// Contexts in document order
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Append a context, rejecting duplicate names
    pub fn add_context(&mut self, context: Context) -> CatalogResult<()> {
        if self.context(&context.name).is_some() {
            return Err(CatalogError::DuplicateContext { name: context.name });
        }
        self.contexts.push(context);
        Ok(())
    }

    /// Find a context by name
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Get a context by name, appending an empty one if absent
    pub fn context_or_insert(&mut self, name: &str) -> &mut Context {
        let index = match self.contexts.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[index]
    }

    /// Drop contexts without messages
    pub fn remove_empty_contexts(&mut self) {
        self.contexts.retain(|c| !c.messages.is_empty());
    }

    /// Order contexts by name
    pub fn sort_contexts(&mut self) {
        self.contexts.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Iterate all messages with their context name
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    /// Total number of messages across contexts
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Builder used by tests and the extractor
    pub fn with_context(mut self, context: Context) -> CatalogResult<Self> {
        self.add_context(context)?;
        Ok(self)
    }

    /// Build a catalog from contexts without uniqueness checks.
    /// Only used by validation tests that need a broken catalog.
    #[cfg(test)]
    pub(crate) fn from_contexts_unchecked(contexts: Vec<Context>) -> Self {
        Self {
            contexts,
            ..Self::default()
        }
    }
}

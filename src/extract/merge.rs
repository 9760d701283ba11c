//! Merge freshly extracted strings into an existing catalog

use crate::catalog::{Catalog, Context, Message, TranslationState};
use crate::config::OutputConfig;
use std::fmt;

/// How a merge treats strings that left the sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Keep vanished messages (with their translations) instead of dropping them
    pub keep_obsolete: bool,
    /// Order contexts by name afterwards
    pub sort_contexts: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for MergeOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            keep_obsolete: config.keep_obsolete,
            sort_contexts: config.sort_contexts,
        }
    }
}

/// Counts of what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// New messages
    pub added: usize,
    /// Messages still in the sources
    pub kept: usize,
    /// Vanished or obsolete messages found again
    pub revived: usize,
    /// Messages newly marked vanished
    pub vanished: usize,
    /// Messages dropped
    pub removed: usize,
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new, {} kept, {} revived, {} vanished, {} removed",
            self.added, self.kept, self.revived, self.vanished, self.removed
        )
    }
}

/// Produce an updated catalog from `existing` and the strings `extracted`
/// from the current sources. Document attributes come from `existing`.
pub fn merge(existing: &Catalog, extracted: &Catalog, options: MergeOptions) -> (Catalog, MergeReport) {
    let mut report = MergeReport::default();
    let mut merged = Catalog::default();
    merged.version = existing.version.clone();
    merged.language = existing.language.clone();
    merged.source_language = existing.source_language.clone();

    for old_context in existing.contexts() {
        let fresh = extracted.context(&old_context.name);
        let mut context = Context::new(old_context.name.clone());

        for old in &old_context.messages {
            let found = fresh.and_then(|c| c.find(&old.source, old.disambiguation()));
            match found {
                Some(found) => context.messages.push(update(old, found, &mut report)),
                None => {
                    if let Some(gone) = retire(old, options, &mut report) {
                        context.messages.push(gone);
                    }
                }
            }
        }

        if let Some(fresh) = fresh {
            for new in &fresh.messages {
                if old_context.find(&new.source, new.disambiguation()).is_none() {
                    context.messages.push(new.clone());
                    report.added += 1;
                }
            }
        }
        merged.context_or_insert(&context.name).messages = context.messages;
    }

    for fresh in extracted.contexts() {
        if existing.context(&fresh.name).is_none() {
            report.added += fresh.messages.len();
            merged.context_or_insert(&fresh.name).messages = fresh.messages.clone();
        }
    }

    merged.remove_empty_contexts();
    if options.sort_contexts {
        merged.sort_contexts();
    }

    log::debug!("Merge: {}", report);
    (merged, report)
}

/// A message still present in the sources
fn update(old: &Message, found: &Message, report: &mut MergeReport) -> Message {
    let mut message = old.clone();
    message.locations = found.locations.clone();
    message.extracomment = found.extracomment.clone().or(message.extracomment);
    message.numerus |= found.numerus;

    if message.state.is_active() {
        report.kept += 1;
    } else {
        message.state = if message.has_translation() {
            TranslationState::Finished
        } else {
            TranslationState::Unfinished
        };
        report.revived += 1;
    }
    message
}

/// A message no longer in the sources. Untranslated messages are dropped.
fn retire(old: &Message, options: MergeOptions, report: &mut MergeReport) -> Option<Message> {
    if !old.state.is_active() {
        if options.keep_obsolete {
            return Some(old.clone());
        }
        report.removed += 1;
        return None;
    }

    if !options.keep_obsolete || !old.has_translation() {
        report.removed += 1;
        return None;
    }

    let mut message = old.clone();
    message.state = TranslationState::Vanished;
    message.locations.clear();
    report.vanished += 1;
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Location;

    fn existing() -> Catalog {
        let mut obsolete = Message::new("Open", "打开");
        obsolete.state = TranslationState::Vanished;

        Catalog::new("zh_CN")
            .with_context(
                Context::new("XLSXEditor")
                    .with_message(Message::new("Save", "保存").with_location("main.cpp", 10))
                    .with_message(Message::new("Warning", "警告").with_location("main.cpp", 20))
                    .with_message(Message::unfinished("Draft").with_location("main.cpp", 30))
                    .with_message(obsolete),
            )
            .unwrap()
            .with_context(
                Context::new("Dialog").with_message(Message::new("Quit", "退出").with_location("d.cpp", 1)),
            )
            .unwrap()
    }

    fn extracted() -> Catalog {
        Catalog::default()
            .with_context(
                Context::new("XLSXEditor")
                    .with_message(Message::unfinished("Save").with_location("main.cpp", 12))
                    .with_message(Message::unfinished("Open").with_location("main.cpp", 40))
                    .with_message(Message::unfinished("Export").with_location("main.cpp", 50)),
            )
            .unwrap()
            .with_context(
                Context::new("DataItem").with_message(Message::unfinished("Form").with_location("item.ui", 6)),
            )
            .unwrap()
    }

    #[test]
    fn test_merge_state_transitions() {
        let (merged, report) = merge(&existing(), &extracted(), MergeOptions::default());

        assert_eq!(merged.language.as_deref(), Some("zh_CN"));
        let names: Vec<_> = merged.contexts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["DataItem", "Dialog", "XLSXEditor"]);

        let editor = merged.context("XLSXEditor").unwrap();
        let save = editor.find("Save", "").unwrap();
        assert_eq!(save.translation, "保存");
        assert_eq!(save.state, TranslationState::Finished);
        assert_eq!(save.locations, vec![Location::new("main.cpp", 12)]);

        let warning = editor.find("Warning", "").unwrap();
        assert_eq!(warning.state, TranslationState::Vanished);
        assert!(warning.locations.is_empty());

        assert!(editor.find("Draft", "").is_none());

        let open = editor.find("Open", "").unwrap();
        assert_eq!(open.state, TranslationState::Finished);
        assert_eq!(open.translation, "打开");

        let export = editor.find("Export", "").unwrap();
        assert_eq!(export.state, TranslationState::Unfinished);

        assert_eq!(
            report,
            MergeReport {
                added: 2,
                kept: 1,
                revived: 1,
                vanished: 2,
                removed: 1,
            }
        );
    }

    #[test]
    fn test_merge_without_obsolete() {
        let options = MergeOptions {
            keep_obsolete: false,
            sort_contexts: false,
        };
        let (merged, report) = merge(&existing(), &extracted(), options);

        // Dialog lost its only message, DataItem is appended
        let names: Vec<_> = merged.contexts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["XLSXEditor", "DataItem"]);
        assert!(merged.messages().all(|(_, m)| m.state.is_active()));
        assert_eq!(report.removed, 3);
        assert_eq!(report.vanished, 0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (once, _) = merge(&existing(), &extracted(), MergeOptions::default());
        let (twice, report) = merge(&once, &extracted(), MergeOptions::default());
        assert_eq!(once, twice);
        assert_eq!(report.added, 0);
        assert_eq!(report.revived, 0);
    }

    #[test]
    fn test_report_display() {
        let report = MergeReport {
            added: 1,
            ..MergeReport::default()
        };
        assert_eq!(report.to_string(), "1 new, 0 kept, 0 revived, 0 vanished, 0 removed");
    }
}

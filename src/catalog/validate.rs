//! Consistency checks over a catalog

use super::{placeholders, Catalog, PluralRule, TranslationState};
use std::collections::HashSet;
use std::fmt;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub context: String,
    /// Source text of the offending message, if the issue is message-level
    pub source: Option<String>,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    DuplicateContext,
    DuplicateMessage,
    EmptyTranslation,
    MissingPlaceholder(u32),
    NumerusFormCount { expected: usize, found: usize },
    NoLocation,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: [{}]", level, self.context)?;
        if let Some(source) = &self.source {
            write!(f, " {:?}", source)?;
        }
        match &self.kind {
            IssueKind::DuplicateContext => write!(f, " context declared more than once"),
            IssueKind::DuplicateMessage => write!(f, " message declared more than once"),
            IssueKind::EmptyTranslation => write!(f, " finished message has no translation"),
            IssueKind::MissingPlaceholder(n) => write!(f, " translation lacks %{}", n),
            IssueKind::NumerusFormCount { expected, found } => {
                write!(f, " expected {} numerus forms, found {}", expected, found)
            }
            IssueKind::NoLocation => write!(f, " active message has no location"),
        }
    }
}

/// Run every check and return the findings in document order
pub fn validate(catalog: &Catalog) -> Vec<Issue> {
    let mut issues = Vec::new();
    let rule = catalog.language.as_deref().map(PluralRule::for_language);
    let mut seen_contexts = HashSet::new();

    for context in catalog.contexts() {
        if !seen_contexts.insert(context.name.as_str()) {
            issues.push(Issue {
                severity: Severity::Error,
                context: context.name.clone(),
                source: None,
                kind: IssueKind::DuplicateContext,
            });
        }

        let mut seen_keys = HashSet::new();
        for message in &context.messages {
            let issue = |severity, kind| Issue {
                severity,
                context: context.name.clone(),
                source: Some(message.source.clone()),
                kind,
            };

            if !seen_keys.insert((message.source.as_str(), message.disambiguation())) {
                issues.push(issue(Severity::Error, IssueKind::DuplicateMessage));
            }

            if !message.state.is_active() {
                continue;
            }

            if message.locations.is_empty() {
                issues.push(issue(Severity::Warning, IssueKind::NoLocation));
            }

            if message.state == TranslationState::Finished
                && !message.source.is_empty()
                && !message.has_translation()
            {
                issues.push(issue(Severity::Warning, IssueKind::EmptyTranslation));
                continue;
            }

            if message.numerus {
                if let Some(rule) = rule {
                    if message.numerus_forms.len() != rule.form_count() {
                        issues.push(issue(
                            Severity::Warning,
                            IssueKind::NumerusFormCount {
                                expected: rule.form_count(),
                                found: message.numerus_forms.len(),
                            },
                        ));
                    }
                }
            } else if message.has_translation() {
                let wanted = placeholders(&message.source);
                let present = placeholders(&message.translation);
                for n in wanted.difference(&present) {
                    issues.push(issue(Severity::Warning, IssueKind::MissingPlaceholder(*n)));
                }
            }
        }
    }

    issues
}

/// Whether any finding is an error
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Context, Message};

    #[test]
    fn test_clean_catalog_has_no_issues() {
        let catalog = Catalog::new("zh_CN")
            .with_context(Context::new("XLSXEditor").with_message(
                Message::new("Failed to load image from %1", "从%1加载图片失败")
                    .with_location("../src/XLSXEditor.cpp", 161),
            ))
            .unwrap();
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_reports_missing_placeholder_and_empty_translation() {
        let catalog = Catalog::new("zh_CN")
            .with_context(
                Context::new("XLSXEditor")
                    .with_message(
                        Message::new("Image file not found: %1", "图片文件未找到")
                            .with_location("a.cpp", 1),
                    )
                    .with_message(Message::new("Save", "").with_location("a.cpp", 2)),
            )
            .unwrap();
        let issues = validate(&catalog);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, IssueKind::MissingPlaceholder(1));
        assert_eq!(issues[1].kind, IssueKind::EmptyTranslation);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_duplicates_are_errors() {
        let ctx = Context::new("DataItem")
            .with_message(Message::new("Keep", "保留").with_location("a.cpp", 1))
            .with_message(Message::new("Keep", "保留").with_location("a.cpp", 2));
        let catalog = Catalog::from_contexts_unchecked(vec![ctx.clone(), ctx]);
        let issues = validate(&catalog);
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.kind == IssueKind::DuplicateContext));
        assert!(issues.iter().any(|i| i.kind == IssueKind::DuplicateMessage));
    }

    #[test]
    fn test_numerus_form_count() {
        let mut msg = Message::new("%n row(s)", "").with_location("a.cpp", 3);
        msg.numerus = true;
        msg.numerus_forms = vec!["%n 行".to_string(), "%n 行".to_string()];
        let catalog = Catalog::new("zh_CN")
            .with_context(Context::new("XLSXEditor").with_message(msg))
            .unwrap();
        let issues = validate(&catalog);
        assert_eq!(
            issues[0].kind,
            IssueKind::NumerusFormCount {
                expected: 1,
                found: 2
            }
        );
    }
}

//! Translation coverage statistics

use super::{Catalog, Context, TranslationState};
use std::fmt;

/// Message counts for one context or a whole catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coverage {
    pub finished: usize,
    pub unfinished: usize,
    /// Vanished and obsolete messages
    pub inactive: usize,
}

impl Coverage {
    /// Count the messages of a context
    pub fn of_context(context: &Context) -> Self {
        let mut coverage = Self::default();
        for message in &context.messages {
            match message.state {
                TranslationState::Finished if message.has_translation() => {
                    coverage.finished += 1
                }
                TranslationState::Finished | TranslationState::Unfinished => {
                    coverage.unfinished += 1
                }
                TranslationState::Vanished | TranslationState::Obsolete => coverage.inactive += 1,
            }
        }
        coverage
    }

    /// Messages still used by the application
    pub fn active(&self) -> usize {
        self.finished + self.unfinished
    }

    /// Percentage of active messages that are finished
    pub fn percent_complete(&self) -> f64 {
        if self.active() == 0 {
            100.0
        } else {
            self.finished as f64 * 100.0 / self.active() as f64
        }
    }

    fn add(&mut self, other: Coverage) {
        self.finished += other.finished;
        self.unfinished += other.unfinished;
        self.inactive += other.inactive;
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} finished ({:.1}%), {} unfinished, {} vanished",
            self.finished,
            self.active(),
            self.percent_complete(),
            self.unfinished,
            self.inactive
        )
    }
}

/// Coverage broken down by context
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    pub contexts: Vec<(String, Coverage)>,
    pub total: Coverage,
}

impl CoverageReport {
    pub fn new(catalog: &Catalog) -> Self {
        let mut total = Coverage::default();
        let contexts = catalog
            .contexts()
            .iter()
            .map(|context| {
                let coverage = Coverage::of_context(context);
                total.add(coverage);
                (context.name.clone(), coverage)
            })
            .collect();
        Self { contexts, total }
    }

    /// Whether every active message is finished
    pub fn is_complete(&self) -> bool {
        self.total.unfinished == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Message;

    #[test]
    fn test_coverage_counts() {
        let mut vanished = Message::new("Old", "旧");
        vanished.state = TranslationState::Vanished;
        let catalog = Catalog::new("zh_CN")
            .with_context(
                Context::new("XLSXEditor")
                    .with_message(Message::new("Save", "保存"))
                    .with_message(Message::unfinished("Restore"))
                    .with_message(Message::new("Blank", ""))
                    .with_message(vanished),
            )
            .unwrap();

        let report = CoverageReport::new(&catalog);
        assert_eq!(report.total.finished, 1);
        assert_eq!(report.total.unfinished, 2);
        assert_eq!(report.total.inactive, 1);
        assert!(!report.is_complete());
        assert!((report.total.percent_complete() - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_empty_catalog_is_complete() {
        let report = CoverageReport::new(&Catalog::new("zh_CN"));
        assert!(report.is_complete());
        assert_eq!(report.total.percent_complete(), 100.0);
    }
}

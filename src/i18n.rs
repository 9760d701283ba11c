//! Process-wide translator
//!
//! An application installs one translator at startup; afterwards strings are
//! translated through [`translate`] or the [`tr!`](crate::tr) macro. Before a
//! translator is installed every lookup returns its source text.

use crate::catalog::{fill_args, Translator};
use std::sync::OnceLock;

static TRANSLATOR: OnceLock<Translator> = OnceLock::new();

/// Install the process-wide translator. Returns the translator back if one
/// was already installed.
pub fn install(translator: Translator) -> Result<(), Translator> {
    TRANSLATOR.set(translator)?;
    if let Some(installed) = TRANSLATOR.get() {
        log::info!(
            "Installed translator for {}",
            installed.catalog().language.as_deref().unwrap_or("unknown language")
        );
    }
    Ok(())
}

/// The installed translator, if any
pub fn installed() -> Option<&'static Translator> {
    TRANSLATOR.get()
}

/// Language of the installed translator
pub fn current_language() -> Option<&'static str> {
    installed().and_then(|t| t.catalog().language.as_deref())
}

/// Translate through the installed translator
pub fn translate(context: &str, source: &str, args: &[&str]) -> String {
    let text = match installed() {
        Some(translator) => translator.lookup(context, source),
        None => source,
    };
    fill_args(text, args).into_owned()
}

/// Translate a string in a context, optionally filling `%1`.. placeholders
///
/// ```ignore
/// let title = tr!("XLSXEditor", "Save");
/// let msg = tr!("XLSXEditor", "Failed to load image from %1", path);
/// ```
#[macro_export]
macro_rules! tr {
    ($context:expr, $source:expr) => {
        $crate::i18n::translate($context, $source, &[])
    };
    ($context:expr, $source:expr, $($arg:expr),+ $(,)?) => {
        $crate::i18n::translate($context, $source, &[$($arg.to_string().as_str()),+])
    };
}

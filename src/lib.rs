//! Linguist Catalog - Qt Linguist `.ts` translation catalogs
//!
//! Loads `.ts` files into an immutable [`Translator`] for runtime lookup,
//! writes them back in Qt's own layout, and maintains them: validation,
//! coverage statistics, string extraction from C++ and Designer sources,
//! and merging extracted strings into an existing catalog.
//!
//! ```no_run
//! use linguist_catalog::{ts, Translator};
//!
//! let catalog = ts::load("translations/XLSXEditor_zh_CN.ts")?;
//! let translator = Translator::new(catalog);
//! assert_eq!(translator.lookup("XLSXEditor", "Save"), "保存");
//! # Ok::<(), linguist_catalog::AppError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod file_handler;
pub mod i18n;
pub mod ts;
pub mod utils;

pub use catalog::{Catalog, Context, Location, Message, PluralRule, TranslationState, Translator};
pub use config::Config;
pub use error::{AppError, AppResult, CatalogError, ConfigError, ExtractError, FileError};

//! Extraction of translatable strings from application sources
//!
//! Walks source directories, pulls strings out of C++ files and Designer
//! forms, and collects them into a fresh catalog ready for [`merge`].

pub mod cpp;
pub mod form;
pub mod merge;

pub use merge::{merge, MergeOptions, MergeReport};

use crate::catalog::{Catalog, Location, Message};
use crate::config::ExtractConfig;
use crate::error::{AppResult, ExtractError, FileError, FileResult};
use crate::file_handler::{read_file_sync, scan_sources, ScanConfig, SourceFile, SourceKind};
use crate::utils::path::{relative_path, to_slash};
use std::path::{Path, PathBuf};

/// A string found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub context: String,
    pub source: String,
    /// Disambiguation
    pub comment: Option<String>,
    /// Developer note
    pub extracomment: Option<String>,
    pub numerus: bool,
    /// 1-based line in the source file
    pub line: u32,
}

/// Extract every string under `roots` into a new catalog. Location file
/// names are written relative to the directory holding `ts_path`.
pub fn extract_dirs(roots: &[PathBuf], ts_path: &Path, config: &ExtractConfig) -> AppResult<Catalog> {
    let scan = ScanConfig::from(config);
    let mut files = Vec::new();
    for root in roots {
        files.extend(scan_sources(root, &scan)?);
    }
    if files.is_empty() {
        return Err(ExtractError::NoSources.into());
    }

    let ts_dir = absolute(ts_path.parent().unwrap_or_else(|| Path::new("")))?;
    let mut catalog = Catalog::default();
    for file in &files {
        let Some(strings) = extract_file(file, config.max_file_size)? else {
            continue;
        };
        let filename = to_slash(&relative_path(&absolute(&file.path)?, &ts_dir));
        log::debug!("{}: {} strings", filename, strings.len());
        collect(&mut catalog, &filename, strings);
    }

    log::info!(
        "Extracted {} messages in {} contexts from {} files",
        catalog.message_count(),
        catalog.contexts().len(),
        files.len()
    );
    Ok(catalog)
}

/// Extract one file. Oversized files are skipped with a warning.
fn extract_file(file: &SourceFile, max_size: u64) -> AppResult<Option<Vec<Extracted>>> {
    let read = match read_file_sync(&file.path, max_size) {
        Ok(read) => read,
        Err(FileError::FileTooLarge { path, size, .. }) => {
            log::warn!("Skipping {} ({} bytes)", path.display(), size);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let strings = match file.kind {
        SourceKind::Cpp => cpp::extract(&read.content),
        SourceKind::Form => form::extract(&read.content, &file.path)?,
    };
    Ok(Some(strings))
}

/// Add strings found in one file to the catalog
fn collect(catalog: &mut Catalog, filename: &str, strings: Vec<Extracted>) {
    for found in strings {
        let location = Location::new(filename, found.line);
        let context = catalog.context_or_insert(&found.context);
        let comment = found.comment.as_deref().unwrap_or("");
        if let Some(existing) = context.find_mut(&found.source, comment) {
            existing.locations.push(location);
            existing.numerus |= found.numerus;
            if existing.extracomment.is_none() {
                existing.extracomment = found.extracomment;
            }
            continue;
        }

        let mut message = Message::unfinished(found.source);
        message.comment = found.comment;
        message.extracomment = found.extracomment;
        message.numerus = found.numerus;
        message.locations.push(location);
        context.messages.push(message);
    }
}

fn absolute(path: &Path) -> FileResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| FileError::DirectoryError {
        path: PathBuf::from("."),
        source: e,
    })?;
    Ok(cwd.join(path))
}

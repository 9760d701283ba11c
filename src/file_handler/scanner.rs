//! Source tree scanner for string extraction
//!
//! Walks one or more directories and collects the files the extractor
//! understands, with:
//! - Configurable depth limits
//! - Extension filtering
//! - Hidden file handling
//! - Ignored directory names

use crate::config::ExtractConfig;
use crate::error::{FileError, FileResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Kind of file the extractor handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// C++ source or header
    Cpp,
    /// Qt Designer form
    Form,
}

/// A file selected for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Configuration for directory scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum directory depth to scan (0 = root only)
    pub max_depth: usize,

    /// C++ extensions, lower-case without dot
    pub source_extensions: HashSet<String>,

    /// Designer form extensions
    pub form_extensions: HashSet<String>,

    /// Whether to descend into hidden directories and include hidden files
    pub show_hidden: bool,

    /// Directories to always ignore
    pub ignored_dirs: HashSet<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&ExtractConfig::default())
    }
}

impl From<&ExtractConfig> for ScanConfig {
    fn from(config: &ExtractConfig) -> Self {
        let lower =
            |v: &Vec<String>| -> HashSet<String> { v.iter().map(|s| s.to_lowercase()).collect() };
        Self {
            max_depth: config.max_depth,
            source_extensions: lower(&config.source_extensions),
            form_extensions: lower(&config.form_extensions),
            show_hidden: false,
            ignored_dirs: config.ignored_directories.iter().cloned().collect(),
        }
    }
}

impl ScanConfig {
    /// Set whether to show hidden files
    pub fn with_hidden(mut self, show: bool) -> Self {
        self.show_hidden = show;
        self
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Add a directory to ignore
    pub fn with_ignored_dir(mut self, dir: impl Into<String>) -> Self {
        self.ignored_dirs.insert(dir.into());
        self
    }

    fn classify(&self, path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if self.source_extensions.contains(&ext) {
            Some(SourceKind::Cpp)
        } else if self.form_extensions.contains(&ext) {
            Some(SourceKind::Form)
        } else {
            None
        }
    }
}

/// Collect extractable files under `root`, sorted by path
pub fn scan_sources(root: impl AsRef<Path>, config: &ScanConfig) -> FileResult<Vec<SourceFile>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root)
        .max_depth(config.max_depth + 1)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()));

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || should_include_dir(e, config))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if !config.show_hidden && is_hidden(&entry) {
            continue;
        }
        if let Some(kind) = config.classify(entry.path()) {
            files.push(SourceFile {
                path: entry.into_path(),
                kind,
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    log::debug!("Found {} source files under {}", files.len(), root.display());
    Ok(files)
}

/// Check if a directory entry should be included during traversal
fn should_include_dir(entry: &DirEntry, config: &ScanConfig) -> bool {
    if entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            if config.ignored_dirs.contains(name) {
                return false;
            }
            if !config.show_hidden && name.starts_with('.') {
                return false;
            }
        }
    }
    true
}

/// Check if an entry is hidden
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

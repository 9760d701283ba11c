//! Error types for linguist-catalog
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog document errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Source extraction errors
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// File is too large to load
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not save file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory does not exist
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Directory operation error
    #[error("Directory error: {path}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Errors raised while reading or building a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The document is not well-formed XML
    #[error("Malformed translation file: {0}")]
    Malformed(String),

    /// The root element is not `<TS>`
    #[error("Unexpected root element <{found}>, expected <TS>")]
    UnexpectedRoot { found: String },

    /// A required child element is absent
    #[error("Missing <{element}> in <{parent}>")]
    MissingElement {
        element: &'static str,
        parent: &'static str,
    },

    /// An attribute could not be interpreted
    #[error("Invalid {attribute} attribute on <{element}>: {value:?}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Two contexts share a name
    #[error("Duplicate context: {name}")]
    DuplicateContext { name: String },

    /// A relative location appears before any file name was seen
    #[error("Relative location without a preceding file name in context {context}")]
    DanglingLocation { context: String },
}

/// Errors raised while extracting strings from application sources
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A Designer form could not be parsed
    #[error("Could not parse form {path}: {reason}")]
    FormParse { path: PathBuf, reason: String },

    /// A Designer form has no `<class>` element
    #[error("Form has no class name: {path}")]
    MissingFormClass { path: PathBuf },

    /// No source files were found to scan
    #[error("No source files found under the given directories")]
    NoSources,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

impl FileError {
    /// Create a user-friendly error message suitable for terminal output
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The file could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This file is too large to load. Maximum file size is {} bytes.",
                    max_size
                )
            }
            FileError::WriteError { .. } => {
                "Could not save the file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl CatalogError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Malformed(_) | CatalogError::UnexpectedRoot { .. } => {
                "The file is not a valid Qt Linguist translation file.".to_string()
            }
            CatalogError::DuplicateContext { name } => {
                format!("The context \"{}\" is declared more than once.", name)
            }
            _ => self.to_string(),
        }
    }
}

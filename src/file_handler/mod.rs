//! File handler module for linguist-catalog
//!
//! Handles all file system operations including:
//! - Reading catalogs with encoding detection
//! - Atomic save operations for data safety
//! - Source tree scanning for extraction

pub mod io;
pub mod scanner;

pub use io::*;
pub use scanner::*;

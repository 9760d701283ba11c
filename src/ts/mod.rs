//! Qt Linguist `.ts` file format
//!
//! Reading rejects malformed documents as a whole; writing reproduces the
//! layout of Qt's own tools so unchanged catalogs round-trip byte for byte.

pub mod reader;
pub mod writer;

pub use reader::parse_str;
pub use writer::{to_string, write_catalog};

use crate::catalog::Catalog;
use crate::error::{AppResult, CatalogError};
use crate::file_handler::{self, FileEncoding, FileReadResult, MAX_FILE_SIZE};
use std::path::Path;

/// Load a catalog from disk
pub fn load(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    let read = file_handler::read_file_sync(path, MAX_FILE_SIZE)?;
    let catalog = parse_str(document_text(&read))?;
    log_loaded(path, &catalog);
    Ok(catalog)
}

/// Load a catalog without blocking the async runtime
pub async fn load_async(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    let read = file_handler::read_file(path, MAX_FILE_SIZE).await?;

    let catalog = tokio::task::spawn_blocking(move || parse_str(document_text(&read)))
        .await
        .map_err(|e| CatalogError::Malformed(format!("parser task failed: {}", e)))??;

    log_loaded(path, &catalog);
    Ok(catalog)
}

/// Write a catalog to disk atomically
pub fn save(path: impl AsRef<Path>, catalog: &Catalog) -> AppResult<()> {
    let path = path.as_ref();
    file_handler::ensure_parent_dir(path)?;
    file_handler::write_file_atomic_sync(path, &to_string(catalog))?;
    log::info!(
        "Wrote {} messages in {} contexts to {}",
        catalog.message_count(),
        catalog.contexts().len(),
        path.display()
    );
    Ok(())
}

/// Text handed to the XML parser. Content decoded from UTF-16 no longer
/// matches its declaration, so the declaration is dropped.
fn document_text(read: &FileReadResult) -> &str {
    let content = read.content.as_str();
    match read.encoding {
        FileEncoding::Utf16Le | FileEncoding::Utf16Be if content.starts_with("<?xml") => content
            .find("?>")
            .map(|end| &content[end + 2..])
            .unwrap_or(content),
        _ => content,
    }
}

fn log_loaded(path: &Path, catalog: &Catalog) {
    log::debug!(
        "Loaded {} ({} contexts, {} messages, language {})",
        path.display(),
        catalog.contexts().len(),
        catalog.message_count(),
        catalog.language.as_deref().unwrap_or("unset")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, FileError};

    const FIXTURE: &str = include_str!("../../translations/XLSXEditor_zh_CN.ts");

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("translations/XLSXEditor_zh_CN.ts");
        let catalog = parse_str(FIXTURE).unwrap();

        save(&path, &catalog).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), FIXTURE);
        assert_eq!(load(&path).unwrap(), catalog);
    }

    #[test]
    fn test_load_utf16_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("utf16.ts");
        let text = FIXTURE.replace("encoding=\"utf-8\"", "encoding=\"utf-16\"");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, bytes).unwrap();

        let catalog = load(&path).unwrap();
        assert_eq!(catalog, parse_str(FIXTURE).unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/no/such/file.ts").unwrap_err();
        assert!(matches!(err, AppError::FileIO(FileError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_async() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("XLSXEditor_zh_CN.ts");
        std::fs::write(&path, FIXTURE).unwrap();

        let catalog = load_async(&path).await.unwrap();
        assert_eq!(catalog.message_count(), 18);
    }
}

//! File I/O operations with encoding detection and atomic writes
//!
//! Provides safe file reading and writing with:
//! - UTF-8 and UTF-16 encoding detection
//! - Atomic writes so a catalog is never left half-written
//! - File size limits

use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Maximum file size allowed (10 MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Detected encoding of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian with BOM
    Utf16Le,
    /// UTF-16 Big Endian with BOM
    Utf16Be,
    /// Unknown/binary (lossy UTF-8 conversion used)
    Unknown,
}

/// Result of reading a file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content as a string
    pub content: String,
    /// Detected encoding
    pub encoding: FileEncoding,
    /// Original file size in bytes
    pub size_bytes: u64,
    /// Whether lossy conversion was used
    pub lossy: bool,
}

/// Detect file encoding from raw bytes
fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return FileEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return FileEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return FileEncoding::Utf16Be;
    }

    if std::str::from_utf8(bytes).is_ok() {
        FileEncoding::Utf8
    } else {
        FileEncoding::Unknown
    }
}

/// Decode bytes to string based on detected encoding
fn decode_content(bytes: &[u8], encoding: FileEncoding) -> (String, bool) {
    match encoding {
        FileEncoding::Utf8 | FileEncoding::Unknown => decode_utf8(bytes),
        FileEncoding::Utf8Bom => decode_utf8(&bytes[3..]),
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> (String, bool) {
    let mut lossy = false;
    let units = bytes.chunks_exact(2).map(|chunk| unit([chunk[0], chunk[1]]));

    let result: String = char::decode_utf16(units)
        .map(|r| {
            r.unwrap_or_else(|_| {
                lossy = true;
                '\u{FFFD}'
            })
        })
        .collect();

    (result, lossy)
}

fn check_size(path: &Path, size_bytes: u64, max_size: u64) -> FileResult<()> {
    if size_bytes > max_size {
        return Err(FileError::FileTooLarge {
            path: path.to_path_buf(),
            size: size_bytes,
            max_size,
        });
    }
    Ok(())
}

fn finish_read(path: &Path, bytes: Vec<u8>) -> FileReadResult {
    let encoding = detect_encoding(&bytes);
    let (content, lossy) = decode_content(&bytes, encoding);
    if lossy {
        log::warn!("{} is not valid {:?}; invalid bytes replaced", path.display(), encoding);
    }
    FileReadResult {
        content,
        encoding,
        size_bytes: bytes.len() as u64,
        lossy,
    }
}

/// Read a file with encoding detection
pub async fn read_file(path: impl AsRef<Path>, max_size: u64) -> FileResult<FileReadResult> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    if !path.exists() {
        return Err(FileError::NotFound(path_buf));
    }

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| FileError::ReadError {
            path: path_buf.clone(),
            source: e,
        })?;
    check_size(path, metadata.len(), max_size)?;

    let bytes = tokio::fs::read(path).await.map_err(|e| FileError::ReadError {
        path: path_buf,
        source: e,
    })?;

    Ok(finish_read(path, bytes))
}

/// Read a file synchronously with encoding detection
pub fn read_file_sync(path: impl AsRef<Path>, max_size: u64) -> FileResult<FileReadResult> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    if !path.exists() {
        return Err(FileError::NotFound(path_buf));
    }

    let metadata = std::fs::metadata(path).map_err(|e| FileError::ReadError {
        path: path_buf.clone(),
        source: e,
    })?;
    check_size(path, metadata.len(), max_size)?;

    let bytes = std::fs::read(path).map_err(|e| FileError::ReadError {
        path: path_buf,
        source: e,
    })?;

    Ok(finish_read(path, bytes))
}

/// Write content to a file synchronously using atomic write
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the target.
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "catalog".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let temp_path = parent.join(format!(".{}.{}.tmp", filename, timestamp));

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    Ok(())
}

/// Ensure parent directory exists
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> FileResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| FileError::DirectoryError {
                path: PathBuf::from(parent),
                source: e,
            })?;
        }
    }
    Ok(())
}

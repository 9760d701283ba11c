//! Utilities module for linguist-catalog
//!
//! Shared helper functions and utilities including:
//! - Path utilities
//! - Text position helpers

/// Path utilities
pub mod path {
    use std::path::{Component, Path, PathBuf};

    /// Make `path` relative to the directory `base`, inserting `..` where
    /// the two diverge. Both paths should be absolute or both relative.
    pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
        let path_parts: Vec<Component<'_>> = path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        let base_parts: Vec<Component<'_>> = base
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();

        let common = path_parts
            .iter()
            .zip(base_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut result = PathBuf::new();
        for _ in common..base_parts.len() {
            result.push("..");
        }
        for part in &path_parts[common..] {
            result.push(part.as_os_str());
        }
        result
    }

    /// Render a path with forward slashes, as catalogs store them
    pub fn to_slash(path: &Path) -> String {
        path.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Guess the target language from a catalog file name such as
    /// `XLSXEditor_zh_CN.ts`
    pub fn guess_language(path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        let parts: Vec<&str> = stem.split('_').collect();
        let is_language =
            |p: &str| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_lowercase());
        let is_region = |p: &str| {
            p.len() == 2 && p.chars().all(|c| c.is_ascii_uppercase())
                || p.len() == 4 && p.starts_with(|c: char| c.is_ascii_uppercase())
        };

        let start = parts.iter().rposition(|p| is_language(p))?;
        if start == 0 || !parts[start + 1..].iter().all(|p| is_region(p)) {
            return None;
        }
        Some(parts[start..].join("_"))
    }

    /// Expand tilde to home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }
}

/// Text utilities
pub mod text {
    /// Byte offsets where each line starts
    pub fn line_starts(text: &str) -> Vec<usize> {
        std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect()
    }

    /// 1-based line number of a byte offset, given [`line_starts`]
    pub fn line_of(line_starts: &[usize], offset: usize) -> u32 {
        line_starts.partition_point(|&start| start <= offset) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_relative_path() {
        assert_eq!(
            path::relative_path(
                Path::new("/proj/src/XLSXEditor.cpp"),
                Path::new("/proj/translations")
            ),
            PathBuf::from("../src/XLSXEditor.cpp")
        );
        assert_eq!(
            path::relative_path(Path::new("/proj/a.cpp"), Path::new("/proj")),
            PathBuf::from("a.cpp")
        );
    }

    #[test]
    fn test_to_slash() {
        let p = PathBuf::from("..").join("src").join("DataItem.ui");
        assert_eq!(path::to_slash(&p), "../src/DataItem.ui");
    }

    #[test]
    fn test_guess_language() {
        let guess = |s: &str| path::guess_language(Path::new(s));
        assert_eq!(guess("XLSXEditor_zh_CN.ts").as_deref(), Some("zh_CN"));
        assert_eq!(guess("my_app_de.ts").as_deref(), Some("de"));
        assert_eq!(guess("app.ts"), None);
    }

    #[test]
    fn test_line_of() {
        let starts = text::line_starts("a\nbb\nccc");
        assert_eq!(starts, vec![0, 2, 5]);
        assert_eq!(text::line_of(&starts, 0), 1);
        assert_eq!(text::line_of(&starts, 3), 2);
        assert_eq!(text::line_of(&starts, 7), 3);
    }
}

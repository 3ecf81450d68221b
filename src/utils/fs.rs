//! File system utilities.

use crate::Result;
use std::path::{Path, PathBuf};

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Replace everything outside `[a-zA-Z0-9.-]` with underscores so scraped
/// titles survive as file names on any filesystem.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Output file for one episode: `<root>/<series>/<episode>.ts`.
///
/// Segments are concatenated as-is, so the container stays MPEG-TS.
pub fn episode_output_path(root: &Path, series_title: &str, episode_name: &str) -> PathBuf {
    root.join(sanitize_filename(series_title))
        .join(format!("{}.ts", sanitize_filename(episode_name)))
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_directory(dir.path()).is_ok());

        let missing = dir.path().join("nope");
        assert!(matches!(
            ensure_directory(&missing),
            Err(crate::Error::PathNotFound(_))
        ));

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_directory(&file),
            Err(crate::Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("One Piece: EP/1075?"), "One_Piece__EP_1075");
        assert_eq!(sanitize_filename("الحلقة 12"), "12");
        assert_eq!(sanitize_filename("???"), "untitled");
    }

    #[test]
    fn test_episode_output_path() {
        let path = episode_output_path(Path::new("/dl"), "My Show", "Ep 1");
        assert_eq!(path, PathBuf::from("/dl/My_Show/Ep_1.ts"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}

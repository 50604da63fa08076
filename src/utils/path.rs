//! Path helpers for naming generated files

use std::path::Path;

/// File name without extension, `video` when the path has none
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| sanitize_component(&stem.to_string_lossy()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

/// Extension including the leading dot, or `fallback` when missing
pub fn extension_or(path: &Path, fallback: &str) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Replace characters that are unsafe in generated file names
pub fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("/tmp/holiday.mov")), "holiday");
        assert_eq!(file_stem(Path::new("/")), "video");
    }

    #[test]
    fn test_extension_or() {
        assert_eq!(extension_or(Path::new("a/b.MKV"), ".mp4"), ".mkv");
        assert_eq!(extension_or(Path::new("a/b"), ".mp4"), ".mp4");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("a:b*c?"), "a_b_c_");
        assert_eq!(sanitize_component("plain name"), "plain name");
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Subtitle extensions understood by every convention (without the dot)
pub const SUBTITLE_EXTENSIONS: &[&str] = &["ass", "ssa", "srt", "sub", "idx", "sup", "vtt", "smi"];

/// Regex fragment matching an optional track marker plus a subtitle extension
pub(crate) const EXT_PATTERN: &str =
    r"(?:\.default|\.forced)?\.(?i:ass|ssa|srt|sub|idx|sup|vtt|smi)";

static BARE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.(?i:ass|ssa|srt|sub|idx|sup|vtt|smi)$").unwrap());

/// True when `extension` is a dot-prefixed subtitle extension without marker
pub fn is_subtitle_extension(extension: &str) -> bool {
    BARE_EXT_RE.is_match(extension)
}

/// True when the path's final extension is one of `extensions` (no dot,
/// case-insensitive)
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.as_ref().eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// A base name must be usable as a filename component in the same directory
pub(crate) fn is_valid_base_name(base_name: &str) -> bool {
    !base_name.is_empty() && !base_name.contains(['/', '\\'])
}

/// Collapse Windows separators so result keys look the same on every platform
pub fn normalize_path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_subtitle_extension() {
        assert!(is_subtitle_extension(".ass"));
        assert!(is_subtitle_extension(".SRT"));
        assert!(!is_subtitle_extension("ass"));
        assert!(!is_subtitle_extension(".default.ass"));
        assert!(!is_subtitle_extension(".mkv"));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("/a/Movie.zh.ass"), SUBTITLE_EXTENSIONS));
        assert!(has_extension(Path::new("Movie.VTT"), SUBTITLE_EXTENSIONS));
        assert!(!has_extension(Path::new("Movie.mkv"), SUBTITLE_EXTENSIONS));
        assert!(!has_extension(Path::new("Movie"), SUBTITLE_EXTENSIONS));

        let videos = vec!["mkv".to_string(), "mp4".to_string()];
        assert!(has_extension(Path::new("Show S01E01.MKV"), &videos));
        assert!(!has_extension(Path::new("Show S01E01.zh.ass"), &videos));
    }

    #[test]
    fn test_normalize_path_key() {
        assert_eq!(
            normalize_path_key(Path::new(r"C:\media\Movie.zh.ass")),
            "C:/media/Movie.zh.ass"
        );
        assert_eq!(normalize_path_key(Path::new("/media/a.ass")), "/media/a.ass");
    }
}

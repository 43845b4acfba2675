use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{is_subtitle_extension, is_valid_base_name, EXT_PATTERN};
use super::descriptor::{FormatDescriptor, GeneratedNames};
use super::{ConventionId, SubtitleFormatter};

/// Language tag grammar: dot-free word starting with a letter, or Han text
const LANG_PATTERN: &str = r"(?:[A-Za-z][A-Za-z0-9_-]*|\p{Han}+)";

static PLAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<base>.+?)(?:\.\[(?P<prefix>[^\[\]/\\]+)\])?\.(?P<lang>{})(?P<ext>{})$",
        LANG_PATTERN, EXT_PATTERN
    ))
    .unwrap()
});

static LANG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!("^{}$", LANG_PATTERN)).unwrap());

/// `Movie (2020).zh.default.ass`, `Movie (2020).[subhd].zh.ass`
///
/// The language tag sits right before the optional marker and extension; an
/// optional bracketed prefix sits between base name and language.
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }

    fn is_marker_word(tag: &str) -> bool {
        tag.eq_ignore_ascii_case("default") || tag.eq_ignore_ascii_case("forced")
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleFormatter for PlainFormatter {
    fn name(&self) -> ConventionId {
        ConventionId::Plain
    }

    fn detect(&self, file_name: &str) -> Option<FormatDescriptor> {
        let caps = PLAIN_RE.captures(file_name)?;
        let lang = &caps["lang"];
        // `Movie.default.ass` carries a marker, not a language
        if Self::is_marker_word(lang) {
            return None;
        }
        Some(FormatDescriptor::new(
            &caps["base"],
            &caps["ext"],
            lang,
            caps.name("prefix").map(|m| m.as_str()).unwrap_or_default(),
        ))
    }

    fn generate(&self, descriptor: &FormatDescriptor) -> GeneratedNames {
        let FormatDescriptor { base_name, extension, language_tag, extra_prefix, .. } = descriptor;

        if !is_valid_base_name(base_name)
            || base_name.contains(".[")
            || !is_subtitle_extension(extension)
            || !LANG_RE.is_match(language_tag)
            || Self::is_marker_word(language_tag)
            || extra_prefix.contains(['[', ']', '/', '\\'])
        {
            return GeneratedNames::empty();
        }

        let stem = if extra_prefix.is_empty() {
            format!("{}.{}", base_name, language_tag)
        } else {
            format!("{}.[{}].{}", base_name, extra_prefix, language_tag)
        };
        GeneratedNames::from_parts(&stem, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::descriptor::TrackMarker;

    #[test]
    fn test_detect_with_marker_left_in_extension() {
        let d = PlainFormatter::new().detect("Movie (2020).zh.default.ass").unwrap();
        assert_eq!(d.base_name, "Movie (2020)");
        assert_eq!(d.language_tag, "zh");
        assert_eq!(d.extension, ".default.ass");
        assert_eq!(d.extra_prefix, "");
        assert_eq!(d.marker, TrackMarker::None);
    }

    #[test]
    fn test_detect_dotted_base_and_prefix() {
        let f = PlainFormatter::new();

        let d = f.detect("The.Matrix.1999.1080p.zh-CN.srt").unwrap();
        assert_eq!(d.base_name, "The.Matrix.1999.1080p");
        assert_eq!(d.language_tag, "zh-CN");
        assert_eq!(d.extension, ".srt");

        let d = f.detect("Movie (2020).[subhd].chs.forced.ass").unwrap();
        assert_eq!(d.base_name, "Movie (2020)");
        assert_eq!(d.extra_prefix, "subhd");
        assert_eq!(d.language_tag, "chs");
        assert_eq!(d.extension, ".forced.ass");

        let d = f.detect("Show S01E01.简英.ass").unwrap();
        assert_eq!(d.language_tag, "简英");
    }

    #[test]
    fn test_language_tag_boundaries() {
        let f = PlainFormatter::new();
        for tag in ["english", "chs1", "zh_subtitle_final", "zh-Hans"] {
            let name = format!("Movie.{}.srt", tag);
            let d = f.detect(&name).unwrap();
            assert_eq!(d.base_name, "Movie");
            assert_eq!(d.language_tag, tag);
            assert_eq!(f.generate(&d).plain, name);
        }

        // marker words and tags with spaces or leading digits are not languages
        assert!(f.detect("Movie.default.srt").is_none());
        assert!(f.detect("Movie.Forced.srt").is_none());
        assert!(f.detect("Movie.zh subs.srt").is_none());
        assert!(f.detect("Movie.1080p.srt").is_none());
        assert!(f.generate(&FormatDescriptor::new("Movie", ".srt", "default", "")).is_empty());
        assert!(f.generate(&FormatDescriptor::new("Movie", ".srt", "zh subs", "")).is_empty());
    }

    #[test]
    fn test_detect_rejects_other_shapes() {
        let f = PlainFormatter::new();
        assert!(f.detect("Movie.default.ass").is_none());
        assert!(f.detect("Movie.ass").is_none());
        assert!(f.detect("Movie.zh.mkv").is_none());
        assert!(f.detect("Movie (2020).chinese(zh).ass").is_none());
    }

    #[test]
    fn test_generate_variants() {
        let f = PlainFormatter::new();
        let names = f.generate(&FormatDescriptor::new("Movie (2020)", ".ass", "zh", ""));
        assert_eq!(names.plain, "Movie (2020).zh.ass");
        assert_eq!(names.default, "Movie (2020).zh.default.ass");
        assert_eq!(names.forced, "Movie (2020).zh.forced.ass");

        let names = f.generate(&FormatDescriptor::new("Movie", ".srt", "en", "subhd"));
        assert_eq!(names.plain, "Movie.[subhd].en.srt");
    }

    #[test]
    fn test_generate_empty_for_unusable_parts() {
        let f = PlainFormatter::new();
        assert!(f.generate(&FormatDescriptor::new("", ".ass", "zh", "")).is_empty());
        assert!(f.generate(&FormatDescriptor::new("Movie", ".ass", "", "")).is_empty());
        assert!(f.generate(&FormatDescriptor::new("Movie", ".default.ass", "zh", "")).is_empty());
        assert!(f.generate(&FormatDescriptor::new("Movie", ".ass", "zh,subhd", "")).is_empty());
        assert!(f.generate(&FormatDescriptor::new("a/b", ".ass", "zh", "")).is_empty());
    }

    #[test]
    fn test_generate_then_detect_is_stable() {
        let f = PlainFormatter::new();
        let original = FormatDescriptor::new("Some.Show.S01E02", ".ass", "zh", "zimuku");
        let names = f.generate(&original);
        for marker in [TrackMarker::None, TrackMarker::Default, TrackMarker::Forced] {
            let detected = f.detect(names.select(marker)).unwrap().split_marker();
            assert_eq!(detected, original.clone().with_marker(marker));
        }
    }
}

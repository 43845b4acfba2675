use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{is_subtitle_extension, is_valid_base_name, EXT_PATTERN};
use super::descriptor::{FormatDescriptor, GeneratedNames};
use super::{ConventionId, SubtitleFormatter};

/// Label media servers show for the subtitle track
const TRACK_LABEL: &str = "chinese";

static MEDIA_SERVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<base>.+)\.{}\((?P<lang>[^(),/\\]+)(?:,(?P<prefix>[^(),/\\]*))?\)(?P<ext>{})$",
        TRACK_LABEL, EXT_PATTERN
    ))
    .unwrap()
});

/// Emby/Jellyfin style: `Movie (2020).chinese(zh,subhd).default.ass`
///
/// Language and source live inside the parenthesised track label, markers go
/// after it.
pub struct MediaServerFormatter;

impl MediaServerFormatter {
    pub fn new() -> Self {
        Self
    }

    fn is_label_safe(value: &str) -> bool {
        !value.contains(['(', ')', ',', '/', '\\'])
    }
}

impl Default for MediaServerFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleFormatter for MediaServerFormatter {
    fn name(&self) -> ConventionId {
        ConventionId::MediaServer
    }

    fn detect(&self, file_name: &str) -> Option<FormatDescriptor> {
        let caps = MEDIA_SERVER_RE.captures(file_name)?;
        Some(FormatDescriptor::new(
            &caps["base"],
            &caps["ext"],
            &caps["lang"],
            caps.name("prefix").map(|m| m.as_str()).unwrap_or_default(),
        ))
    }

    fn generate(&self, descriptor: &FormatDescriptor) -> GeneratedNames {
        let FormatDescriptor { base_name, extension, language_tag, extra_prefix, .. } = descriptor;

        if !is_valid_base_name(base_name)
            || !is_subtitle_extension(extension)
            || language_tag.is_empty()
            || !Self::is_label_safe(language_tag)
            || !Self::is_label_safe(extra_prefix)
        {
            return GeneratedNames::empty();
        }

        let label = if extra_prefix.is_empty() {
            format!("{}({})", TRACK_LABEL, language_tag)
        } else {
            format!("{}({},{})", TRACK_LABEL, language_tag, extra_prefix)
        };
        GeneratedNames::from_parts(&format!("{}.{}", base_name, label), extension)
    }
}

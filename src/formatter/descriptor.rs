use serde::Serialize;

/// Extension infix marking the default subtitle track
pub const MARKER_DEFAULT: &str = ".default";
/// Extension infix marking the forced subtitle track
pub const MARKER_FORCED: &str = ".forced";

/// Track marker carried by a subtitle filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackMarker {
    #[default]
    None,
    Default,
    Forced,
}

impl TrackMarker {
    /// Split a detected extension such as `.default.ass` into its marker and
    /// the bare extension `.ass`.
    ///
    /// Only a marker sitting directly in front of the final extension counts.
    pub fn strip(extension: &str) -> (TrackMarker, String) {
        if let Some(rest) = extension.strip_prefix(MARKER_DEFAULT) {
            if rest.starts_with('.') {
                return (TrackMarker::Default, rest.to_string());
            }
        }
        if let Some(rest) = extension.strip_prefix(MARKER_FORCED) {
            if rest.starts_with('.') {
                return (TrackMarker::Forced, rest.to_string());
            }
        }
        (TrackMarker::None, extension.to_string())
    }
}

/// Convention-independent decomposition of one subtitle filename.
///
/// Formatters hand this back from detection with any track marker still glued
/// to `extension`; [`FormatDescriptor::split_marker`] moves it into `marker`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormatDescriptor {
    /// Filename stem shared with the video file
    pub base_name: String,
    /// Subtitle extension including the leading dot, e.g. `.ass`
    pub extension: String,
    /// Language or region tag, passed through untouched
    pub language_tag: String,
    /// Extra convention-specific segment, e.g. the download source
    pub extra_prefix: String,
    pub marker: TrackMarker,
}

impl FormatDescriptor {
    pub fn new(
        base_name: impl Into<String>,
        extension: impl Into<String>,
        language_tag: impl Into<String>,
        extra_prefix: impl Into<String>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            extension: extension.into(),
            language_tag: language_tag.into(),
            extra_prefix: extra_prefix.into(),
            marker: TrackMarker::None,
        }
    }

    pub fn with_marker(mut self, marker: TrackMarker) -> Self {
        self.marker = marker;
        self
    }

    /// Move a `.default` / `.forced` infix out of `extension` into `marker`
    pub fn split_marker(mut self) -> Self {
        let (marker, extension) = TrackMarker::strip(&self.extension);
        if marker != TrackMarker::None {
            self.marker = marker;
            self.extension = extension;
        }
        self
    }

    pub fn is_default_track(&self) -> bool {
        self.marker == TrackMarker::Default
    }

    pub fn is_forced_track(&self) -> bool {
        self.marker == TrackMarker::Forced
    }
}

/// The three filenames a formatter produces for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedNames {
    pub plain: String,
    pub default: String,
    pub forced: String,
}

impl GeneratedNames {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build all three variants by inserting the marker infix between `stem`
    /// and `extension`.
    pub fn from_parts(stem: &str, extension: &str) -> Self {
        Self {
            plain: format!("{}{}", stem, extension),
            default: format!("{}{}{}", stem, MARKER_DEFAULT, extension),
            forced: format!("{}{}{}", stem, MARKER_FORCED, extension),
        }
    }

    pub fn select(&self, marker: TrackMarker) -> &str {
        match marker {
            TrackMarker::None => &self.plain,
            TrackMarker::Default => &self.default,
            TrackMarker::Forced => &self.forced,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.default.is_empty() && self.forced.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_marker() {
        assert_eq!(
            TrackMarker::strip(".default.ass"),
            (TrackMarker::Default, ".ass".to_string())
        );
        assert_eq!(
            TrackMarker::strip(".forced.srt"),
            (TrackMarker::Forced, ".srt".to_string())
        );
        assert_eq!(TrackMarker::strip(".ass"), (TrackMarker::None, ".ass".to_string()));
        // a bare ".default" is not a marker in front of an extension
        assert_eq!(
            TrackMarker::strip(".default"),
            (TrackMarker::None, ".default".to_string())
        );
    }

    #[test]
    fn test_split_marker_sets_exactly_one_flag() {
        let d = FormatDescriptor::new("Movie", ".forced.ass", "zh", "").split_marker();
        assert_eq!(d.extension, ".ass");
        assert!(d.is_forced_track());
        assert!(!d.is_default_track());

        let d = FormatDescriptor::new("Movie", ".ass", "zh", "").split_marker();
        assert!(!d.is_forced_track());
        assert!(!d.is_default_track());
    }

    #[test]
    fn test_generated_names_marker_exclusivity() {
        let names = GeneratedNames::from_parts("Movie.zh", ".ass");
        assert_eq!(names.plain, "Movie.zh.ass");
        assert_eq!(names.select(TrackMarker::Default), "Movie.zh.default.ass");
        assert_eq!(names.select(TrackMarker::Forced), "Movie.zh.forced.ass");
        assert!(!names.plain.contains(MARKER_DEFAULT) && !names.plain.contains(MARKER_FORCED));
        assert!(!names.default.contains(MARKER_FORCED));
        assert!(!names.forced.contains(MARKER_DEFAULT));
    }
}

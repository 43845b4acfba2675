// Subtitle filename conventions
//
// Every convention implements SubtitleFormatter:
// - detect: decompose a filename written in this convention
// - generate: write a descriptor back out in this convention
//
// Track markers (.default / .forced) are handled outside the formatters so all
// conventions share the same marker semantics.
//
// To add a convention:
// 1. Implement SubtitleFormatter in a new module
// 2. Add a ConventionId variant and list it in ConventionId::ALL
// 3. Update FormatterFactory::create_formatter

pub mod common;
pub mod descriptor;
pub mod media_server;
pub mod plain;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use common::*;
pub use descriptor::*;
use crate::error::{Result, SubfmtError};

/// Stable identifier of a naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConventionId {
    /// `Movie.zh.default.ass`
    #[serde(alias = "normal")]
    Plain,
    /// `Movie.chinese(zh,source).default.ass`
    #[serde(alias = "emby")]
    MediaServer,
}

impl ConventionId {
    /// Registry order; detection tries conventions in this order
    pub const ALL: [ConventionId; 2] = [ConventionId::Plain, ConventionId::MediaServer];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConventionId::Plain => "plain",
            ConventionId::MediaServer => "media-server",
        }
    }

    /// Numeric selector written to older settings files
    pub fn legacy_code(&self) -> i64 {
        match self {
            ConventionId::MediaServer => 0,
            ConventionId::Plain => 1,
        }
    }

    /// Numeric selector stored by older settings files: 0 = media-server, 1 = plain.
    ///
    /// Compatibility shim: any other code falls back to media-server instead of
    /// failing. Named lookups never fall back.
    pub fn from_legacy_code(code: i64) -> ConventionId {
        match code {
            1 => ConventionId::Plain,
            _ => ConventionId::MediaServer,
        }
    }
}

impl fmt::Display for ConventionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConventionId {
    type Err = SubfmtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "normal" => Ok(ConventionId::Plain),
            "media-server" | "mediaserver" | "emby" => Ok(ConventionId::MediaServer),
            _ => Err(SubfmtError::UnknownConvention(s.to_string())),
        }
    }
}

/// One subtitle naming convention
pub trait SubtitleFormatter: Send + Sync {
    fn name(&self) -> ConventionId;

    /// Decompose `file_name` (no directory part) if it follows this convention.
    ///
    /// A `.default` / `.forced` marker stays inside the returned extension.
    fn detect(&self, file_name: &str) -> Option<FormatDescriptor>;

    /// Build the plain, default and forced filenames for `descriptor`.
    ///
    /// The descriptor's marker is ignored. Returns empty names when the parts
    /// cannot form a valid filename in this convention. Pure; never touches disk.
    fn generate(&self, descriptor: &FormatDescriptor) -> GeneratedNames;
}

/// Factory for creating formatter instances
pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create_formatter(id: ConventionId) -> Arc<dyn SubtitleFormatter> {
        match id {
            ConventionId::Plain => Arc::new(plain::PlainFormatter::new()),
            ConventionId::MediaServer => Arc::new(media_server::MediaServerFormatter::new()),
        }
    }
}

/// Immutable set of formatters, one per convention
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: BTreeMap<ConventionId, Arc<dyn SubtitleFormatter>>,
}

impl FormatterRegistry {
    /// Registry holding every supported convention
    pub fn new() -> Self {
        Self::with_conventions(&ConventionId::ALL)
    }

    /// Registry restricted to the given conventions
    pub fn with_conventions(ids: &[ConventionId]) -> Self {
        let formatters = ids
            .iter()
            .map(|id| (*id, FormatterFactory::create_formatter(*id)))
            .collect();
        Self { formatters }
    }

    pub fn resolve(&self, id: ConventionId) -> Result<Arc<dyn SubtitleFormatter>> {
        self.formatters
            .get(&id)
            .cloned()
            .ok_or(SubfmtError::FormatterNotRegistered(id))
    }

    pub fn resolve_name(&self, name: &str) -> Result<Arc<dyn SubtitleFormatter>> {
        self.resolve(name.parse()?)
    }

    /// Formatter for a legacy numeric selector; unknown codes get media-server
    pub fn legacy_formatter(&self, code: i64) -> Result<Arc<dyn SubtitleFormatter>> {
        self.resolve(ConventionId::from_legacy_code(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SubtitleFormatter>> {
        self.formatters.values()
    }

    pub fn conventions(&self) -> Vec<ConventionId> {
        self.formatters.keys().copied().collect()
    }

    /// First formatter whose pattern matches `file_name`, with the track
    /// marker already split out of the extension.
    pub fn detect(&self, file_name: &str) -> Option<(ConventionId, FormatDescriptor)> {
        self.iter().find_map(|formatter| {
            formatter
                .detect(file_name)
                .map(|descriptor| (formatter.name(), descriptor.split_marker()))
        })
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_descriptors() -> Vec<FormatDescriptor> {
        vec![
            FormatDescriptor::new("Movie (2020)", ".ass", "zh", ""),
            FormatDescriptor::new("Some.Show.S01E03.1080p", ".srt", "chs", "subhd"),
            FormatDescriptor::new("电影", ".ssa", "简英", "zimuku"),
            FormatDescriptor::new("Film", ".ASS", "zh-Hant", ""),
        ]
    }

    #[test]
    fn test_convention_names() {
        assert_eq!("plain".parse::<ConventionId>().unwrap(), ConventionId::Plain);
        assert_eq!("Emby".parse::<ConventionId>().unwrap(), ConventionId::MediaServer);
        assert_eq!(ConventionId::MediaServer.to_string(), "media-server");
        assert!(matches!(
            "kodi".parse::<ConventionId>(),
            Err(SubfmtError::UnknownConvention(_))
        ));
    }

    #[test]
    fn test_legacy_code_fallback() {
        assert_eq!(ConventionId::from_legacy_code(0), ConventionId::MediaServer);
        assert_eq!(ConventionId::from_legacy_code(1), ConventionId::Plain);
        assert_eq!(ConventionId::from_legacy_code(42), ConventionId::MediaServer);
        assert_eq!(ConventionId::from_legacy_code(-1), ConventionId::MediaServer);
        for id in ConventionId::ALL {
            assert_eq!(ConventionId::from_legacy_code(id.legacy_code()), id);
        }

        let registry = FormatterRegistry::new();
        assert_eq!(registry.legacy_formatter(7).unwrap().name(), ConventionId::MediaServer);
    }

    #[test]
    fn test_registry_holds_one_formatter_per_convention() {
        let registry = FormatterRegistry::new();
        assert_eq!(registry.conventions(), ConventionId::ALL.to_vec());
        for id in ConventionId::ALL {
            assert_eq!(registry.resolve(id).unwrap().name(), id);
        }
        assert!(registry.resolve_name("nope").is_err());
    }

    #[test]
    fn test_resolve_unregistered_fails() {
        let registry = FormatterRegistry::with_conventions(&[ConventionId::Plain]);
        assert!(matches!(
            registry.resolve(ConventionId::MediaServer),
            Err(SubfmtError::FormatterNotRegistered(ConventionId::MediaServer))
        ));
    }

    #[test]
    fn test_cross_convention_round_trip() {
        let registry = FormatterRegistry::new();
        for descriptor in sample_descriptors() {
            for source in ConventionId::ALL {
                for target in ConventionId::ALL {
                    let src = registry.resolve(source).unwrap();
                    let dst = registry.resolve(target).unwrap();
                    let direct = dst.generate(&descriptor);
                    let source_names = src.generate(&descriptor);

                    for marker in [TrackMarker::None, TrackMarker::Default, TrackMarker::Forced] {
                        let (detected_by, detected) =
                            registry.detect(source_names.select(marker)).unwrap();
                        assert_eq!(detected_by, source);
                        assert_eq!(detected.marker, marker);
                        let converted = dst.generate(&detected);
                        assert_eq!(converted.select(marker), direct.select(marker));
                    }
                }
            }
        }
    }

    #[test]
    fn test_detect_unknown_name() {
        let registry = FormatterRegistry::new();
        assert!(registry.detect("Movie (2020).ass").is_none());
        assert!(registry.detect("readme.txt").is_none());
    }
}

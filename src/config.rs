use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SubfmtError};
use crate::formatter::{ConventionId, SUBTITLE_EXTENSIONS};

fn default_video_extensions() -> Vec<String> {
    ["mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m2ts", "ts", "rmvb"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_subtitle_extensions() -> Vec<String> {
    SUBTITLE_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_language_hints() -> Vec<String> {
    ["zh", "chs", "cht", "chi", "zho", "chinese", "简", "繁", "中"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub formatter: FormatterConfig,
    #[serde(default)]
    pub scanner: ScanConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root directory holding one folder per movie
    pub movies_root: Option<PathBuf>,
    /// Root directory holding one folder per series
    pub series_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Convention every subtitle gets renamed to
    pub target: Option<ConventionId>,
    /// Numeric selector from older settings files, used when `target` is unset
    pub legacy_code: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions treated as video files (without dot)
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    /// Extensions treated as subtitle files (without dot)
    #[serde(default = "default_subtitle_extensions")]
    pub subtitle_extensions: Vec<String>,
    /// A movie subtitle is picked up only if its name contains one of these
    /// (case-insensitive). Empty accepts every subtitle.
    #[serde(default = "default_language_hints")]
    pub language_hints: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            video_extensions: default_video_extensions(),
            subtitle_extensions: default_subtitle_extensions(),
            language_hints: default_language_hints(),
        }
    }
}

impl FormatterConfig {
    /// Explicit target, else the legacy selector, else media-server
    pub fn target_convention(&self) -> ConventionId {
        match (self.target, self.legacy_code) {
            (Some(target), _) => target,
            (None, Some(code)) => ConventionId::from_legacy_code(code),
            (None, None) => ConventionId::MediaServer,
        }
    }
}

impl LibraryConfig {
    pub fn movies_root(&self) -> Result<&Path> {
        self.movies_root
            .as_deref()
            .ok_or_else(|| SubfmtError::Config("library.movies_root is not set".to_string()))
    }

    pub fn series_root(&self) -> Result<&Path> {
        self.series_root
            .as_deref()
            .ok_or_else(|| SubfmtError::Config("library.series_root is not set".to_string()))
    }
}

/// Fails unless `path` exists and is a directory
pub fn ensure_dir(kind: &'static str, path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(SubfmtError::RootNotFound {
            kind,
            path: path.display().to_string(),
        })
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubfmtError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubfmtError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubfmtError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubfmtError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Both library roots must be set and be existing directories
    pub fn validate(&self) -> Result<()> {
        ensure_dir("movies", self.library.movies_root()?)?;
        ensure_dir("series", self.library.series_root()?)?;
        if self.scanner.subtitle_extensions.is_empty() {
            return Err(SubfmtError::Config(
                "scanner.subtitle_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

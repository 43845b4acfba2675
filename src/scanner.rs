use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{Result, SubfmtError};
use crate::formatter::has_extension;

/// Discovers subtitle candidates in a media library
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryScanner: Send + Sync {
    /// Every movie video file below `root`
    async fn list_movies(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Subtitles belonging to one movie video; `None` when it has none
    async fn movie_subtitles(&self, video: &Path) -> Result<Option<Vec<PathBuf>>>;

    /// Every series directory directly below `root`
    async fn list_series(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Subtitles matching a video anywhere inside one series directory
    async fn series_subtitles(&self, series_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Filesystem scanner pairing subtitles with videos by filename stem
pub struct FsLibraryScanner {
    config: ScanConfig,
}

impl FsLibraryScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn is_video(&self, path: &Path) -> bool {
        has_extension(path, &self.config.video_extensions)
    }

    fn is_subtitle(&self, path: &Path) -> bool {
        has_extension(path, &self.config.subtitle_extensions)
    }

    /// `Movie.zh.ass` belongs to `Movie.mkv`
    fn belongs_to(subtitle: &Path, video_stem: &str) -> bool {
        subtitle
            .file_name()
            .and_then(|n| n.to_str())
            .map(|name| {
                name.len() > video_stem.len() + 1
                    && name.starts_with(video_stem)
                    && name[video_stem.len()..].starts_with('.')
            })
            .unwrap_or(false)
    }

    fn matches_language_hint(&self, subtitle: &Path, video_stem: &str) -> bool {
        if self.config.language_hints.is_empty() {
            return true;
        }
        let name = subtitle.file_name().unwrap_or_default().to_string_lossy();
        let suffix = name[video_stem.len()..].to_lowercase();
        self.config
            .language_hints
            .iter()
            .any(|hint| suffix.contains(&hint.to_lowercase()))
    }

    fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| {
                SubfmtError::Discovery(format!("Failed to walk {}: {}", dir.display(), e))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl LibraryScanner for FsLibraryScanner {
    async fn list_movies(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let movies: Vec<PathBuf> = Self::walk_files(root)?
            .into_iter()
            .filter(|p| self.is_video(p))
            .collect();
        debug!("Found {} movie files under {}", movies.len(), root.display());
        Ok(movies)
    }

    async fn movie_subtitles(&self, video: &Path) -> Result<Option<Vec<PathBuf>>> {
        let dir = video.parent().ok_or_else(|| {
            SubfmtError::Discovery(format!("Video has no parent directory: {}", video.display()))
        })?;
        let stem = video
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                SubfmtError::Discovery(format!("Invalid video filename: {}", video.display()))
            })?;

        let mut subtitles = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file()
                && self.is_subtitle(&path)
                && Self::belongs_to(&path, stem)
                && self.matches_language_hint(&path, stem)
            {
                subtitles.push(path);
            }
        }
        subtitles.sort();

        if subtitles.is_empty() {
            Ok(None)
        } else {
            Ok(Some(subtitles))
        }
    }

    async fn list_series(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut series = Vec::new();
        let mut entries = tokio::fs::read_dir(root).await.map_err(|e| {
            SubfmtError::Discovery(format!("Failed to list {}: {}", root.display(), e))
        })?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                series.push(entry.path());
            }
        }
        series.sort();
        debug!("Found {} series under {}", series.len(), root.display());
        Ok(series)
    }

    async fn series_subtitles(&self, series_dir: &Path) -> Result<Vec<PathBuf>> {
        let files = Self::walk_files(series_dir)?;

        let mut stems_by_dir: HashMap<PathBuf, Vec<String>> = HashMap::new();
        for video in files.iter().filter(|p| self.is_video(p)) {
            if let (Some(parent), Some(stem)) =
                (video.parent(), video.file_stem().and_then(|s| s.to_str()))
            {
                stems_by_dir
                    .entry(parent.to_path_buf())
                    .or_default()
                    .push(stem.to_string());
            }
        }

        let subtitles = files
            .into_iter()
            .filter(|p| self.is_subtitle(p))
            .filter(|p| {
                p.parent()
                    .and_then(|parent| stems_by_dir.get(parent))
                    .map(|stems| stems.iter().any(|stem| Self::belongs_to(p, stem)))
                    .unwrap_or(false)
            })
            .collect();
        Ok(subtitles)
    }
}

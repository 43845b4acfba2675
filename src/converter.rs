use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ensure_dir, Config};
use crate::error::Result;
use crate::formatter::{normalize_path_key, ConventionId, FormatterRegistry, SubtitleFormatter};
use crate::scanner::{FsLibraryScanner, LibraryScanner};

/// Outcome of one conversion batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameResults {
    /// New path -> number of successful renames onto it
    pub renamed_files: BTreeMap<String, usize>,
    /// Original path -> number of failed rename attempts
    pub err_files: BTreeMap<String, usize>,
    /// Batch stopped early because it was cancelled
    pub cancelled: bool,
}

impl RenameResults {
    pub fn record_renamed(&mut self, new_path: &Path) {
        *self.renamed_files.entry(normalize_path_key(new_path)).or_insert(0) += 1;
    }

    pub fn record_failed(&mut self, original_path: &Path) {
        *self.err_files.entry(normalize_path_key(original_path)).or_insert(0) += 1;
    }

    pub fn renamed_count(&self) -> usize {
        self.renamed_files.values().sum()
    }

    pub fn failed_count(&self) -> usize {
        self.err_files.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.renamed_files.is_empty() && self.err_files.is_empty()
    }
}

/// Detects the naming convention of library subtitles and renames them to a
/// target convention.
pub struct SubFormatConverter {
    registry: Arc<FormatterRegistry>,
    scanner: Arc<dyn LibraryScanner>,
}

impl SubFormatConverter {
    pub fn new(registry: Arc<FormatterRegistry>, scanner: Arc<dyn LibraryScanner>) -> Self {
        Self { registry, scanner }
    }

    /// Converter using every convention and the filesystem scanner
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(FormatterRegistry::new()),
            Arc::new(FsLibraryScanner::new(config.scanner.clone())),
        )
    }

    pub fn registry(&self) -> &FormatterRegistry {
        &self.registry
    }

    /// Rename every detectable subtitle under both library roots to `target`.
    ///
    /// Invalid roots, an unknown target and series discovery errors fail the
    /// whole batch before anything is renamed. A movie whose subtitles cannot
    /// be listed is skipped. Individual rename failures end up in
    /// [`RenameResults::err_files`].
    pub async fn convert_all(
        &self,
        movies_root: &Path,
        series_root: &Path,
        target: ConventionId,
        cancel: &CancellationToken,
    ) -> Result<RenameResults> {
        let formatter = self.registry.resolve(target)?;
        info!(
            "Converting subtitles to {} (movies: {}, series: {})",
            target,
            movies_root.display(),
            series_root.display()
        );

        let candidates = self.discover(movies_root, series_root).await?;
        let mut results = RenameResults::default();
        self.convert_candidates(&candidates, formatter.as_ref(), cancel, &mut results).await;

        info!(
            "Conversion finished: {} renamed, {} failed",
            results.renamed_count(),
            results.failed_count()
        );
        Ok(results)
    }

    /// Renames [`convert_all`](Self::convert_all) would perform, as
    /// `(from, to)` pairs
    pub async fn plan_all(
        &self,
        movies_root: &Path,
        series_root: &Path,
        target: ConventionId,
    ) -> Result<Vec<(PathBuf, PathBuf)>> {
        let formatter = self.registry.resolve(target)?;
        let candidates = self.discover(movies_root, series_root).await?;
        Ok(candidates
            .into_iter()
            .filter_map(|path| {
                self.destination(&path, formatter.as_ref())
                    .map(|new_path| (path, new_path))
            })
            .collect())
    }

    /// Every subtitle candidate below both roots, movies first
    async fn discover(&self, movies_root: &Path, series_root: &Path) -> Result<Vec<PathBuf>> {
        ensure_dir("movies", movies_root)?;
        ensure_dir("series", series_root)?;

        let movies = self.scanner.list_movies(movies_root).await?;
        let series_dirs = self.scanner.list_series(series_root).await?;
        info!("Found {} movies and {} series", movies.len(), series_dirs.len());

        let mut candidates = Vec::new();
        for movie in &movies {
            match self.scanner.movie_subtitles(movie).await {
                Ok(Some(subtitles)) => candidates.extend(subtitles),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", movie.display(), e),
            }
        }
        for series_dir in &series_dirs {
            candidates.extend(self.scanner.series_subtitles(series_dir).await?);
        }
        debug!("Discovered {} subtitle candidates", candidates.len());
        Ok(candidates)
    }

    /// Rename an explicit list of subtitle files to `target`
    pub async fn convert_files(
        &self,
        paths: &[PathBuf],
        target: ConventionId,
        cancel: &CancellationToken,
    ) -> Result<RenameResults> {
        let formatter = self.registry.resolve(target)?;
        let mut results = RenameResults::default();
        self.convert_candidates(paths, formatter.as_ref(), cancel, &mut results).await;
        Ok(results)
    }

    /// Destination `path` would be renamed to under `target`, without touching
    /// the filesystem. `None` when no rename would happen.
    pub fn plan(&self, path: &Path, target: ConventionId) -> Result<Option<PathBuf>> {
        let formatter = self.registry.resolve(target)?;
        Ok(self.destination(path, formatter.as_ref()))
    }

    fn destination(&self, path: &Path, target: &dyn SubtitleFormatter) -> Option<PathBuf> {
        let file_name = path.file_name()?.to_str()?;

        // stop at the first convention that recognises the name
        let Some((source, descriptor)) = self.registry.detect(file_name) else {
            debug!("No convention matches {}", file_name);
            return None;
        };

        let names = target.generate(&descriptor);
        let new_name = names.select(descriptor.marker);
        if new_name.is_empty() {
            debug!("{} cannot be expressed as {}, skipping", file_name, target.name());
            return None;
        }

        let new_path = path.with_file_name(new_name);
        if new_path == path {
            debug!("{} already follows {}", file_name, target.name());
            return None;
        }
        debug!("{} ({}) -> {}", file_name, source, new_name);
        Some(new_path)
    }

    async fn convert_candidates(
        &self,
        paths: &[PathBuf],
        target: &dyn SubtitleFormatter,
        cancel: &CancellationToken,
        results: &mut RenameResults,
    ) {
        for path in paths {
            if cancel.is_cancelled() {
                info!("Conversion cancelled");
                results.cancelled = true;
                return;
            }

            let Some(new_path) = self.destination(path, target) else {
                continue;
            };

            match Self::rename(path, &new_path).await {
                Ok(()) => {
                    info!("Renamed {} -> {}", path.display(), new_path.display());
                    results.record_renamed(&new_path);
                }
                Err(e) => {
                    warn!("Failed to rename {}: {}", path.display(), e);
                    results.record_failed(path);
                }
            }
        }
    }

    /// Same-directory rename that refuses to overwrite an existing file.
    ///
    /// Linking fails atomically when `to` exists. Filesystems without hard
    /// links fall back to check-then-rename, which can still lose a file
    /// created at `to` between the check and the rename.
    async fn rename(from: &Path, to: &Path) -> std::io::Result<()> {
        match tokio::fs::hard_link(from, to).await {
            Ok(()) => {
                if let Err(e) = tokio::fs::remove_file(from).await {
                    let _ = tokio::fs::remove_file(to).await;
                    return Err(e);
                }
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(e),
            Err(e) => {
                debug!("Hard link {} failed ({}), renaming instead", to.display(), e);
                if tokio::fs::try_exists(to).await? {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!("destination exists: {}", to.display()),
                    ));
                }
                tokio::fs::rename(from, to).await
            }
        }
    }
}

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cache::{CacheLookup, CacheRecord, MetadataCache};

/// Overview shown until a metadata fetch fills one in.
pub const DEFAULT_OVERVIEW: &str = "No description available.";

/// Placeholder identifier used when an episode has no poster on disk.
pub const EPISODE_POSTER_PLACEHOLDER: &str = "video.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A single video file; cached under its raw filename stem.
    Movie,
    /// A folder of episode files; cached under the resolved show name.
    Series,
}

/// One scanned library item, either a standalone video or a series folder.
///
/// Created by the scanner, seeded synchronously from the cache, then
/// refined asynchronously by a metadata fetch. Entries are rebuilt on every
/// scan; nothing here ever deletes a cache file.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub kind: EntryKind,
    /// File path for movies, directory path for series.
    pub path: PathBuf,
    /// Current cache key. For a series this starts as the folder name and
    /// moves to the resolved show name once a fetch completes, so naming
    /// variants of the same show share one cache entry. Movies keep the raw
    /// filename stem.
    pub cache_key: String,
    pub title: String,
    pub overview: String,
    pub genres: Vec<i64>,
    pub poster: Option<PathBuf>,
}

impl MediaEntry {
    /// Build a standalone-video entry, seeded from the cache when possible.
    pub fn movie(path: PathBuf, cache: &MetadataCache) -> Self {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let display = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self::seeded(EntryKind::Movie, path, stem, display, cache)
    }

    /// Build a series-folder entry, seeded from the cache when possible.
    pub fn series(path: PathBuf, cache: &MetadataCache) -> Self {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self::seeded(EntryKind::Series, path, name.clone(), name, cache)
    }

    fn seeded(
        kind: EntryKind,
        path: PathBuf,
        cache_key: String,
        fallback_title: String,
        cache: &MetadataCache,
    ) -> Self {
        let mut entry = Self {
            kind,
            path,
            cache_key,
            title: fallback_title,
            overview: DEFAULT_OVERVIEW.to_string(),
            genres: Vec::new(),
            poster: None,
        };

        match cache.get(&entry.cache_key) {
            CacheLookup::Hit(record) => entry.apply_record(&record),
            CacheLookup::Corrupt => {
                tracing::debug!("Cache record for '{}' was corrupt, refetching", entry.cache_key);
            }
            CacheLookup::Miss => {}
        }
        entry.poster = cache.poster_path(&entry.cache_key);

        entry
    }

    /// Overlay a cache record onto this entry. Empty fields keep their
    /// current (possibly default) values.
    pub fn apply_record(&mut self, record: &CacheRecord) {
        if !record.title.is_empty() {
            self.title = record.title.clone();
        }
        if !record.overview.is_empty() {
            self.overview = record.overview.clone();
        }
        self.genres = record.genres.clone();
    }
}

/// Episodes of one series grouped under `"Season <n>"` labels.
pub type SeasonGroups = BTreeMap<String, Vec<EpisodeRef>>;

/// One episode file inside a series folder.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRef {
    pub season: u32,
    /// 0 when the filename carried no parseable episode number.
    pub episode: u32,
    pub title: String,
    pub path: PathBuf,
    /// Poster path, or [`EPISODE_POSTER_PLACEHOLDER`] when none exists.
    pub poster: String,
}

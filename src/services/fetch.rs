// Background metadata enrichment: one detached task per library entry

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::cache::{CacheRecord, MetadataCache};
use crate::models::{EntryKind, MediaEntry};
use crate::scanner::parser::clean_title;
use crate::services::tmdb::TmdbClient;

/// Why an enrichment attempt produced nothing.
///
/// Both variants degrade to "no metadata yet": the caller logs and keeps the
/// entry's prior values. There is no retry and no backoff.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("metadata request failed: {0}")]
    Network(anyhow::Error),
    #[error("no match for '{0}'")]
    NoMatch(String),
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        FetchError::Network(err)
    }
}

/// Metadata fetched for one entry, already written back to the cache.
#[derive(Debug)]
pub struct Enrichment {
    /// Key the record was cached under. For series this is the resolved
    /// show name, which may differ from the folder-name seed key.
    pub cache_key: String,
    pub record: CacheRecord,
    pub poster: Option<std::path::PathBuf>,
}

impl Enrichment {
    pub fn apply_to(&self, entry: &mut MediaEntry) {
        entry.cache_key = self.cache_key.clone();
        entry.apply_record(&self.record);
        if self.poster.is_some() {
            entry.poster = self.poster.clone();
        }
    }
}

/// Spawns one fetch task per entry against TMDB.
#[derive(Clone)]
pub struct Fetcher {
    tmdb: Arc<TmdbClient>,
    cache: Arc<MetadataCache>,
}

impl Fetcher {
    pub fn new(tmdb: Arc<TmdbClient>, cache: Arc<MetadataCache>) -> Self {
        Self { tmdb, cache }
    }

    /// Spawn a detached fetch for `entry`.
    ///
    /// The task owns everything it needs; dropping the handle detaches it,
    /// in which case it still completes its cache write but its result is
    /// simply discarded. Failures are logged here and never propagate.
    pub fn spawn(&self, entry: &MediaEntry) -> JoinHandle<Option<Enrichment>> {
        let tmdb = Arc::clone(&self.tmdb);
        let cache = Arc::clone(&self.cache);
        let kind = entry.kind;
        let seed_key = entry.cache_key.clone();
        let lookup_name = match kind {
            EntryKind::Movie => entry
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
            EntryKind::Series => seed_key.clone(),
        };

        tokio::spawn(async move {
            match fetch_one(&tmdb, &cache, kind, &lookup_name, &seed_key).await {
                Ok(enrichment) => Some(enrichment),
                Err(FetchError::NoMatch(query)) => {
                    tracing::debug!("No TMDB match for '{}'", query);
                    None
                }
                Err(e) => {
                    tracing::warn!("Metadata fetch for '{}' failed: {}", lookup_name, e);
                    None
                }
            }
        })
    }
}

async fn fetch_one(
    tmdb: &TmdbClient,
    cache: &MetadataCache,
    kind: EntryKind,
    lookup_name: &str,
    seed_key: &str,
) -> Result<Enrichment, FetchError> {
    let query = clean_title(lookup_name);

    let (cache_key, record, poster_path) = match kind {
        EntryKind::Movie => {
            let best = tmdb
                .search_movie(&query)
                .await?
                .ok_or_else(|| FetchError::NoMatch(query.clone()))?;
            // Movies stay keyed by the raw filename stem
            let record = CacheRecord {
                title: best.title,
                overview: best.overview.unwrap_or_default(),
                genres: best.genre_ids,
            };
            (seed_key.to_string(), record, best.poster_path)
        }
        EntryKind::Series => {
            let best = tmdb
                .search_tv(&query)
                .await?
                .ok_or_else(|| FetchError::NoMatch(query.clone()))?;
            // Series re-key to the resolved show name so naming variants
            // of the same show share one cache entry
            let record = CacheRecord {
                title: best.name.clone(),
                overview: best.overview.unwrap_or_default(),
                genres: best.genre_ids,
            };
            (best.name, record, best.poster_path)
        }
    };

    // Last-writer-wins is fine here: two fetches for the same key carry the
    // same payload
    if let Err(e) = cache.put(&cache_key, &record) {
        tracing::warn!("Failed to write cache record for '{}': {}", cache_key, e);
    }

    let poster = match poster_path {
        Some(ref tmdb_path) => match tmdb.download_poster(tmdb_path, &cache_key, cache).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Poster download for '{}' failed: {}", cache_key, e);
                None
            }
        },
        None => cache.poster_path(&cache_key),
    };

    Ok(Enrichment {
        cache_key,
        record,
        poster,
    })
}

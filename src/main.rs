use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinelib::cache::MetadataCache;
use cinelib::config::{self, Config};
use cinelib::models::EntryKind;
use cinelib::scanner;
use cinelib::services::fetch::Fetcher;
use cinelib::services::tmdb::TmdbClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinelib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let config_path = config::config_file_path();
    let config = Config::load(&config_path)?;

    let cache_root = config::cache_root();
    tracing::info!("Cache directory: {}", cache_root.display());
    let cache = Arc::new(MetadataCache::open(&cache_root)?);

    let tmdb = Arc::new(TmdbClient::new(config.tmdb_api_key.clone())?);

    // Genre id -> name table, fetched once per session; failure degrades
    // to showing raw ids
    let genres = match tmdb.genre_table().await {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("Failed to fetch genre table: {}", e);
            HashMap::new()
        }
    };

    let folders = config.scan_folders();
    tracing::info!("Scanning {} folder(s)", folders.len());
    let mut entries = scanner::scan_folders(&folders, &cache);
    tracing::info!("Found {} entries", entries.len());

    // One detached fetch per entry; failures leave the entry at its
    // cache-seeded or default values
    let fetcher = Fetcher::new(Arc::clone(&tmdb), Arc::clone(&cache));
    let handles: Vec<_> = entries.iter().map(|entry| fetcher.spawn(entry)).collect();
    let results = futures::future::join_all(handles).await;

    for (entry, result) in entries.iter_mut().zip(results) {
        match result {
            Ok(Some(enrichment)) => enrichment.apply_to(entry),
            Ok(None) => {}
            Err(e) => tracing::warn!("Fetch task for '{}' panicked: {}", entry.title, e),
        }
    }

    for entry in entries.iter().filter(|e| config.last_type.matches(e.kind)) {
        let genre_names: Vec<&str> = entry
            .genres
            .iter()
            .filter_map(|id| genres.get(id).map(String::as_str))
            .collect();

        match entry.kind {
            EntryKind::Movie => {
                tracing::info!(
                    "Movie: {} [{}] ({})",
                    entry.title,
                    genre_names.join(", "),
                    entry.path.display()
                );
                if let Some(position) = config.position_for(&entry.path) {
                    tracing::info!("  resume at {} ms", position);
                }
            }
            EntryKind::Series => {
                tracing::info!(
                    "Series: {} [{}] ({})",
                    entry.title,
                    genre_names.join(", "),
                    entry.path.display()
                );
                for (season, episodes) in scanner::group_seasons(&entry.path) {
                    tracing::info!("  {}: {} episode(s)", season, episodes.len());
                    for episode in episodes {
                        tracing::info!("    E{:02} {}", episode.episode, episode.title);
                    }
                }
            }
        }
    }

    Ok(())
}

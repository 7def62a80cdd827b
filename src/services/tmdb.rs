// TMDB metadata provider
// API Documentation: https://developer.themoviedb.org/reference/intro/getting-started

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::MetadataCache;

const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// TMDB API client
pub struct TmdbClient {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct MovieSearchResults {
    #[serde(default)]
    pub results: Vec<MovieSearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieSearchResult {
    pub title: String,
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TvSearchResults {
    #[serde(default)]
    pub results: Vec<TvSearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvSearchResult {
    pub name: String,
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    id: i64,
    name: String,
}

fn poster_url(tmdb_path: &str) -> String {
    format!("{}{}", TMDB_IMAGE_BASE, tmdb_path)
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, api_key })
    }

    /// Search for a movie; returns the highest-ranked result, if any.
    pub async fn search_movie(&self, query: &str) -> Result<Option<MovieSearchResult>> {
        let url = format!(
            "{}/search/movie?api_key={}&query={}&language=en-US",
            TMDB_API_BASE,
            self.api_key,
            urlencoding::encode(query)
        );

        let response: MovieSearchResults = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to search TMDB for movies")?
            .json()
            .await
            .context("Failed to parse TMDB movie search response")?;

        Ok(response.results.into_iter().next())
    }

    /// Search for a TV series; returns the highest-ranked result, if any.
    pub async fn search_tv(&self, query: &str) -> Result<Option<TvSearchResult>> {
        let url = format!(
            "{}/search/tv?api_key={}&query={}&language=en-US",
            TMDB_API_BASE,
            self.api_key,
            urlencoding::encode(query)
        );

        let response: TvSearchResults = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to search TMDB for TV shows")?
            .json()
            .await
            .context("Failed to parse TMDB TV search response")?;

        Ok(response.results.into_iter().next())
    }

    /// Fetch the genre id -> name table. Fetched once per session.
    pub async fn genre_table(&self) -> Result<HashMap<i64, String>> {
        let url = format!(
            "{}/genre/movie/list?api_key={}&language=en-US",
            TMDB_API_BASE, self.api_key
        );

        let response: GenreList = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch TMDB genre list")?
            .json()
            .await
            .context("Failed to parse TMDB genre list")?;

        Ok(response
            .genres
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect())
    }

    /// Download a poster at original resolution into the cache under `key`.
    pub async fn download_poster(
        &self,
        tmdb_path: &str,
        key: &str,
        cache: &MetadataCache,
    ) -> Result<PathBuf> {
        let url = poster_url(tmdb_path);
        tracing::debug!("Downloading poster: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to download poster from TMDB")?;

        if !response.status().is_success() {
            anyhow::bail!("TMDB poster download failed with status: {}", response.status());
        }

        let bytes = response.bytes().await?;
        let path = cache.save_poster(key, &bytes)?;
        tracing::debug!("Saved poster to {}", path.display());
        Ok(path)
    }
}

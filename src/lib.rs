//! Local media library core: scans folders for videos and series,
//! parses season/episode info from filenames, caches per-title metadata
//! and posters on disk, and enriches entries from TMDB in the background.

pub mod cache;
pub mod config;
pub mod models;
pub mod scanner;
pub mod services;

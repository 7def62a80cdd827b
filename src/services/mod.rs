// Services module - remote metadata providers and enrichment

pub mod fetch;
pub mod tmdb;

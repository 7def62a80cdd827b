// Library scanner: folder enumeration, entry classification, season grouping

pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::MetadataCache;
use crate::models::{EpisodeRef, MediaEntry, SeasonGroups, EPISODE_POSTER_PLACEHOLDER};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "flv", "wmv", "webm"];

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scan the configured folders into a list of library entries.
///
/// Only direct children are classified: a video file becomes a standalone
/// movie entry, a directory with at least one direct-child video file
/// becomes a series entry, and anything else is ignored. Folders that do
/// not exist are skipped silently. Result order follows filesystem
/// enumeration order; callers that need stable ordering must sort.
pub fn scan_folders(folders: &[PathBuf], cache: &MetadataCache) -> Vec<MediaEntry> {
    let mut entries = Vec::new();

    for folder in folders {
        if !folder.exists() {
            tracing::debug!("Skipping missing folder: {}", folder.display());
            continue;
        }

        let dir = match fs::read_dir(folder) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Failed to read folder {}: {}", folder.display(), e);
                continue;
            }
        };

        for entry in dir.flatten() {
            let path = entry.path();
            if path.is_file() && is_video_file(&path) {
                entries.push(MediaEntry::movie(path, cache));
            } else if path.is_dir() && has_direct_video(&path) {
                entries.push(MediaEntry::series(path, cache));
            }
        }
    }

    entries
}

fn has_direct_video(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().is_file() && is_video_file(&e.path()))
        })
        .unwrap_or(false)
}

/// Flat enumeration of video files across the given folders.
///
/// With `recursive` set, nested folders are walked and every matching file
/// is included regardless of depth; otherwise only top-level files count.
pub fn list_videos(folders: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut videos = Vec::new();
    for folder in folders {
        if !folder.exists() {
            continue;
        }
        collect_videos(folder, recursive, &mut videos);
    }
    videos
}

fn collect_videos(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read folder {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && is_video_file(&path) {
            out.push(path);
        } else if recursive && path.is_dir() {
            collect_videos(&path, recursive, out);
        }
    }
}

/// Group the episode files of a series folder by season.
///
/// Keys are the literal `"Season <n>"` labels. Within a season, episodes
/// are ordered by the secondary episode-number lookup on the file stem
/// (not the primary parse), with scan order breaking ties.
pub fn group_seasons(series_dir: &Path) -> SeasonGroups {
    let mut seasons = SeasonGroups::new();

    let entries = match fs::read_dir(series_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "Failed to read series folder {}: {}",
                series_dir.display(),
                e
            );
            return seasons;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_video_file(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let parsed = parser::parse_filename(name);
        seasons
            .entry(format!("Season {}", parsed.season))
            .or_default()
            .push(EpisodeRef {
                season: parsed.season,
                episode: parsed.episode,
                title: parsed.title,
                path,
                poster: EPISODE_POSTER_PLACEHOLDER.to_string(),
            });
    }

    for episodes in seasons.values_mut() {
        episodes.sort_by_key(|ep| {
            ep.path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(parser::episode_number)
                .unwrap_or(0)
        });
    }

    seasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("/a/Movie.MKV")));
        assert!(is_video_file(Path::new("clip.webm")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_classifies_movies_and_series() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::open(&dir.path().join("cache")).unwrap();

        let media = dir.path().join("media");
        fs::create_dir(&media).unwrap();
        touch(&media.join("Movie.mkv"));
        fs::create_dir(media.join("Show")).unwrap();
        touch(&media.join("Show/S01E01 - Pilot.mkv"));
        // A subfolder without any video file is excluded entirely
        fs::create_dir(media.join("Empty")).unwrap();
        touch(&media.join("Empty/notes.txt"));

        let mut entries = scan_folders(&[media], &cache);
        entries.sort_by(|a, b| a.title.cmp(&b.title));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Movie);
        assert_eq!(entries[0].title, "Movie.mkv");
        assert_eq!(entries[1].kind, EntryKind::Series);
        assert_eq!(entries[1].title, "Show");
    }

    #[test]
    fn test_scan_skips_missing_folders() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::open(&dir.path().join("cache")).unwrap();

        let entries = scan_folders(&[PathBuf::from("/definitely/not/here")], &cache);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_scan_seeds_movie_from_cache_by_stem() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::open(&dir.path().join("cache")).unwrap();

        let media = dir.path().join("media");
        fs::create_dir(&media).unwrap();
        touch(&media.join("Movie.2021.1080p.mkv"));

        // Movies are keyed by the raw stem, before any cleaning
        cache
            .put(
                "Movie.2021.1080p",
                &crate::cache::CacheRecord {
                    title: "Movie".to_string(),
                    overview: "Cached.".to_string(),
                    genres: vec![35],
                },
            )
            .unwrap();

        let entries = scan_folders(&[media], &cache);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Movie");
        assert_eq!(entries[0].overview, "Cached.");
    }

    #[test]
    fn test_list_videos_recursive_and_flat() {
        let dir = tempdir().unwrap();
        let media = dir.path().join("media");
        fs::create_dir_all(media.join("nested/deeper")).unwrap();
        touch(&media.join("top.mkv"));
        touch(&media.join("nested/mid.mp4"));
        touch(&media.join("nested/deeper/low.avi"));
        touch(&media.join("nested/skip.txt"));

        let flat = list_videos(std::slice::from_ref(&media), false);
        assert_eq!(flat.len(), 1);

        let mut all = list_videos(std::slice::from_ref(&media), true);
        all.sort();
        let names: Vec<_> = all
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["low.avi", "mid.mp4", "top.mkv"]);
    }

    #[test]
    fn test_group_seasons_orders_by_episode() {
        let dir = tempdir().unwrap();
        let show = dir.path().join("Show");
        fs::create_dir(&show).unwrap();
        // Created out of order on purpose
        touch(&show.join("S01E02 - Beta.mkv"));
        touch(&show.join("S01E01 - Alpha.mkv"));

        let seasons = group_seasons(&show);
        assert_eq!(seasons.len(), 1);

        let eps = &seasons["Season 1"];
        assert_eq!(eps[0].title, "Alpha");
        assert_eq!(eps[0].episode, 1);
        assert_eq!(eps[1].title, "Beta");
        assert_eq!(eps[1].episode, 2);
        assert_eq!(eps[0].poster, EPISODE_POSTER_PLACEHOLDER);
    }

    #[test]
    fn test_group_seasons_splits_by_season_and_defaults() {
        let dir = tempdir().unwrap();
        let show = dir.path().join("Show");
        fs::create_dir(&show).unwrap();
        touch(&show.join("S02E01 - Opener.mkv"));
        touch(&show.join("random clip.mkv"));

        let seasons = group_seasons(&show);
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons["Season 2"][0].episode, 1);

        // Unparseable names land in Season 1 with episode 0 and the stem
        // as their title
        let fallback = &seasons["Season 1"][0];
        assert_eq!(fallback.episode, 0);
        assert_eq!(fallback.title, "random clip");
    }

    #[test]
    fn test_group_sorts_by_secondary_lookup_not_primary_parse() {
        let dir = tempdir().unwrap();
        let show = dir.path().join("Show");
        fs::create_dir(&show).unwrap();
        touch(&show.join("S01E01 - Alpha.mkv"));
        touch(&show.join("S01E02 - Beta.mkv"));
        // Primary parse fails here (marker not at the start), so this file
        // groups as episode 0 -- but the sort key is the secondary lookup,
        // which still reads episode 3 out of the stem.
        touch(&show.join("Weird S01E03 - Cut.mkv"));

        let eps = &group_seasons(&show)["Season 1"];
        assert_eq!(eps.len(), 3);
        assert_eq!(eps[0].title, "Alpha");
        assert_eq!(eps[1].title, "Beta");
        assert_eq!(eps[2].episode, 0);
        assert_eq!(eps[2].title, "Weird S01E03 - Cut");
    }
}

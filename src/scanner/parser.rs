// Filename parsing for season/episode numbers and title cleanup

use regex::Regex;
use std::sync::LazyLock;

static RE_SEASON_EP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Ss](\d{1,2})[Ee](\d{1,2})\s*-\s*(.*)$").unwrap());
static RE_EP_LOOKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Ss]\d{1,2}[Ee](\d{1,2})").unwrap());
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static RE_RELEASE_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(720p|1080p|2160p|480p|HDR|BluRay|WEBRip|x264|H\.?264)\b").unwrap()
});
static RE_SPACE_COLLAPSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Result of parsing an episode filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub season: u32,
    pub episode: u32,
    pub title: String,
}

fn strip_extension(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// Parse `S<season>E<episode> - <title>` from the start of a filename.
///
/// The pattern is anchored: a `SxxExx` marker later in the name does not
/// count. Unparseable names fall back to season 1, episode 0, and the full
/// stem as the title.
pub fn parse_filename(name: &str) -> ParsedName {
    let stem = strip_extension(name);

    if let Some(caps) = RE_SEASON_EP.captures(stem) {
        let season = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let (Some(season), Some(episode)) = (season, episode) {
            let title = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
            return ParsedName {
                season,
                episode,
                title: title.to_string(),
            };
        }
    }

    ParsedName {
        season: 1,
        episode: 0,
        title: stem.to_string(),
    }
}

/// Episode number used as a sort key, extracted from anywhere in the string.
///
/// Deliberately independent of [`parse_filename`]: the two use different
/// anchoring and can disagree on malformed names. Returns 0 when no
/// `SxxExx` marker is found.
pub fn episode_number(name: &str) -> u32 {
    RE_EP_LOOKUP
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Clean a filename into a title suitable for a remote metadata lookup.
///
/// Strips the extension, turns `.` and `_` separators into spaces, removes a
/// standalone 1900-2099 year and common release-quality tags, and collapses
/// whitespace. Idempotent. Not used for season/episode parsing.
pub fn clean_title(name: &str) -> String {
    let stem = strip_extension(name).replace(['.', '_'], " ");
    let stem = RE_YEAR.replace_all(&stem, "");
    let stem = RE_RELEASE_TAGS.replace_all(&stem, "");
    RE_SPACE_COLLAPSE
        .replace_all(stem.trim(), " ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_episode() {
        let parsed = parse_filename("S01E02 - Beta.mkv");
        assert_eq!(
            parsed,
            ParsedName {
                season: 1,
                episode: 2,
                title: "Beta".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        let parsed = parse_filename("s03e07-  The One.avi");
        assert_eq!(parsed.season, 3);
        assert_eq!(parsed.episode, 7);
        assert_eq!(parsed.title, "The One");
    }

    #[test]
    fn test_parse_two_digit_numbers() {
        let parsed = parse_filename("S10E12 - Finale.webm");
        assert_eq!((parsed.season, parsed.episode), (10, 12));
    }

    #[test]
    fn test_parse_fallback_returns_full_stem() {
        let parsed = parse_filename("Movie.2021.1080p.mkv");
        assert_eq!(
            parsed,
            ParsedName {
                season: 1,
                episode: 0,
                title: "Movie.2021.1080p".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_requires_marker_at_start() {
        // The marker appears mid-name, so the primary parse falls back...
        let parsed = parse_filename("Pilot S01E05 - Cut.mkv");
        assert_eq!((parsed.season, parsed.episode), (1, 0));

        // ...while the secondary lookup still finds the episode. The two
        // parsers intentionally diverge on names like this.
        assert_eq!(episode_number("Pilot S01E05 - Cut"), 5);
    }

    #[test]
    fn test_episode_number_lookup() {
        assert_eq!(episode_number("The Show S02E05 extra"), 5);
        assert_eq!(episode_number("s1e9"), 9);
        assert_eq!(episode_number("no marker here"), 0);
    }

    #[test]
    fn test_clean_title_strips_year_and_tags() {
        assert_eq!(clean_title("Movie.2021.1080p.mkv"), "Movie");
        assert_eq!(clean_title("Some_Show 2160p BluRay x264"), "Some Show");
        assert_eq!(clean_title("Heat 1995 WEBRip H264.avi"), "Heat");
    }

    #[test]
    fn test_clean_title_keeps_out_of_range_years() {
        // 1899 and 2101 are not in the 1900-2099 window
        assert_eq!(clean_title("Voyage 1899"), "Voyage 1899");
        assert_eq!(clean_title("Odyssey 2101"), "Odyssey 2101");
    }

    #[test]
    fn test_clean_title_is_idempotent() {
        for name in ["Movie.2021.1080p.mkv", "Plain Title", "A_B_C 720p"] {
            let once = clean_title(name);
            assert_eq!(clean_title(&once), once);
        }
    }
}

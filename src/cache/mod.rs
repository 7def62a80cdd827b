// Per-title metadata and poster cache
//
// Layout:
//   <cache-root>/metadata/<key>.json
//   <cache-root>/posters/<key>.jpg

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const METADATA_DIR: &str = "metadata";
const POSTER_DIR: &str = "posters";

/// Persisted metadata record for one title.
///
/// Only these three fields survive a round trip; anything else found in an
/// on-disk record is dropped. Genre ids are coerced to integers on read, so
/// records written with numeric strings still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "coerce_genre_ids")]
    pub genres: Vec<i64>,
}

fn coerce_genre_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GenreId {
        Num(i64),
        Text(String),
    }

    let raw = Vec::<GenreId>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|id| match id {
            GenreId::Num(n) => Ok(n),
            GenreId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom("genre id is not an integer")),
        })
        .collect()
}

/// Outcome of a cache lookup.
///
/// `Corrupt` means the record file existed but could not be parsed; the file
/// has already been deleted so the next lookup is a plain `Miss`. Callers
/// treat `Miss` and `Corrupt` the same apart from logging.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(CacheRecord),
    Miss,
    Corrupt,
}

#[derive(Debug)]
pub struct MetadataCache {
    metadata_dir: PathBuf,
    poster_dir: PathBuf,
}

impl MetadataCache {
    /// Open the cache at `root`, creating the directory tree on first use.
    pub fn open(root: &Path) -> io::Result<Self> {
        let metadata_dir = root.join(METADATA_DIR);
        let poster_dir = root.join(POSTER_DIR);
        fs::create_dir_all(&metadata_dir)?;
        fs::create_dir_all(&poster_dir)?;
        Ok(Self {
            metadata_dir,
            poster_dir,
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.metadata_dir.join(format!("{}.json", key))
    }

    fn poster_file(&self, key: &str) -> PathBuf {
        self.poster_dir.join(format!("{}.jpg", key))
    }

    /// Look up the record for `key`.
    ///
    /// Never returns an error: unreadable files count as a miss and
    /// unparseable files are deleted (self-healing) and reported `Corrupt`.
    pub fn get(&self, key: &str) -> CacheLookup {
        let path = self.record_path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheLookup::Miss,
            Err(e) => {
                tracing::warn!("Failed to read cache record {}: {}", path.display(), e);
                return CacheLookup::Miss;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => CacheLookup::Hit(record),
            Err(e) => {
                tracing::warn!(
                    "Discarding corrupt cache record {}: {}",
                    path.display(),
                    e
                );
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!("Failed to remove corrupt record: {}", e);
                }
                CacheLookup::Corrupt
            }
        }
    }

    /// Write the record for `key`, replacing any previous one.
    ///
    /// Whole-file replacement, no fsync: a half-written file is acceptable
    /// because the next `get` treats it as corrupt.
    pub fn put(&self, key: &str, record: &CacheRecord) -> io::Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(key), json)
    }

    /// Path of the cached poster for `key`, if one exists on disk.
    /// The file contents are not validated.
    pub fn poster_path(&self, key: &str) -> Option<PathBuf> {
        let path = self.poster_file(key);
        path.exists().then_some(path)
    }

    /// Store poster bytes for `key`, silently overwriting.
    pub fn save_poster(&self, key: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.poster_file(key);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

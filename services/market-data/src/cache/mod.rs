//! On-disk universe cache with an explicit TTL.
//!
//! Key is the source URL set, value the sorted ticker list plus fetch
//! timestamp. A stale, missing, unreadable, or key-mismatched file is a
//! cache miss; writes are best-effort and never fail a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    fetched_at: DateTime<Utc>,
    symbols: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UniverseCache {
    path: PathBuf,
    ttl: Duration,
}

impl UniverseCache {
    pub fn new(path: impl AsRef<Path>, ttl: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ttl,
        }
    }

    /// Fresh symbols for this source key, or `None` on any kind of miss.
    pub fn load(&self, key: &str) -> Option<Vec<String>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        if entry.key != key {
            return None;
        }
        let age = Utc::now().signed_duration_since(entry.fetched_at);
        if age.num_seconds() < 0 || age.to_std().ok()? > self.ttl {
            return None;
        }
        Some(entry.symbols)
    }

    /// Best-effort write; failure is logged and swallowed.
    pub fn store(&self, key: &str, symbols: &[String]) {
        let entry = CacheEntry {
            key: key.to_string(),
            fetched_at: Utc::now(),
            symbols: symbols.to_vec(),
        };
        let write = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&self.path, json).map_err(|e| e.to_string()));
        if let Err(e) = write {
            tracing::warn!("universe cache write failed: {} -> {}", self.path.display(), e);
        }
    }
}

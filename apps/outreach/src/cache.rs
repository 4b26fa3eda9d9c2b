//! Content Cache: a JSON file of `{cache_key, response}` entries.
//!
//! The file is an ordered array pretty-printed with a 4-space indent. In memory it is
//! indexed by key. Every miss rewrites the whole file through a temp file + rename, so
//! a crash mid-write leaves the previous file intact. Concurrent processes can still
//! lose each other's updates (last writer wins).

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single persisted cache record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub response: Value,
}

/// Key for the raw-payload layer: what a fetcher returned for a URL.
pub fn raw_key(source: &str, url: &str) -> String {
    format!("raw:{source}:{}", url.trim())
}

/// Key for the summary layer. Hashes the template text together with the content so
/// editing a prompt invalidates its summaries without touching raw payloads.
pub fn summary_key(template_id: &str, template_text: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template_text.as_bytes());
    hasher.update([0u8]);
    hasher.update(content.as_bytes());
    format!("summary:{template_id}:{}", hex::encode(hasher.finalize()))
}

/// In-memory view of the cache file. Insertion order is preserved for persistence.
#[derive(Debug, Default)]
pub struct CacheTable {
    entries: Vec<CacheEntry>,
    index: HashMap<String, usize>,
}

impl CacheTable {
    /// Builds the table from persisted entries. When a racing writer left duplicate
    /// keys behind, the first occurrence wins.
    fn from_entries(raw: Vec<CacheEntry>) -> Self {
        let mut table = CacheTable::default();
        for entry in raw {
            if table.index.contains_key(&entry.cache_key) {
                debug!("Dropping duplicate cache key '{}'", entry.cache_key);
                continue;
            }
            table.index.insert(entry.cache_key.clone(), table.entries.len());
            table.entries.push(entry);
        }
        table
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].response)
    }

    pub fn insert(&mut self, key: String, response: Value) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].response = response,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(CacheEntry {
                    cache_key: key,
                    response,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-backed cache. Holds only the path; the file is re-read on every lookup so
/// that entries written by an earlier run (or another process) are picked up.
#[derive(Debug, Clone)]
pub struct ContentCache {
    path: PathBuf,
}

impl ContentCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cache file. A missing or malformed file yields an empty table.
    pub fn load(&self) -> CacheTable {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {}, starting fresh", self.path.display());
                return CacheTable::default();
            }
            Err(e) => {
                warn!(
                    "Cannot read cache file {} ({e}), starting fresh",
                    self.path.display()
                );
                return CacheTable::default();
            }
        };

        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    "Cache file {} is not a valid entry list ({e}), starting fresh",
                    self.path.display()
                );
                return CacheTable::default();
            }
        };

        let total = values.len();
        let entries: Vec<CacheEntry> = values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if entries.len() < total {
            warn!(
                "Skipped {} malformed entries in cache file {}",
                total - entries.len(),
                self.path.display()
            );
        }

        CacheTable::from_entries(entries)
    }

    /// Rewrites the whole cache file atomically.
    pub fn save(&self, table: &CacheTable) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |source: std::io::Error| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut tmp,
                PrettyFormatter::with_indent(b"    "),
            );
            table.entries.serialize(&mut serializer)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(
            "Wrote {} cache entries to {}",
            table.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Looks up a value without fetching. Entries that do not deserialize into `T`
    /// are reported as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let table = self.load();
        let value = table.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Cached value for '{key}' has an unexpected shape ({e}), ignoring");
                None
            }
        }
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_value(value)?;
        let mut table = self.load();
        table.insert(key.to_string(), json);
        self.save(&table)
    }

    /// Returns the cached value for `key`, or runs `fetch`, stores its result and
    /// returns it. A failed fetch leaves the cache untouched.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            info!(cache_key = key, "Fetched data from local cache");
            return Ok(hit);
        }

        info!(cache_key = key, "Cache miss, fetching new data");
        let value = fetch().await?;
        self.put(key, &value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache_in(dir: &tempfile::TempDir) -> ContentCache {
        ContentCache::new(dir.path().join("json_cache.json"))
    }

    #[tokio::test]
    async fn test_second_lookup_does_not_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: String = cache
                .get_or_fetch("raw:website:https://example.com", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, CacheError>("payload".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "payload");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_behaves_as_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        std::fs::write(cache.path(), "{ this is not json").unwrap();

        let value: u32 = cache
            .get_or_fetch("k", || async { Ok::<_, CacheError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        // The broken file was replaced by a valid one holding the new entry.
        let table = cache.load();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("k"), Some(&serde_json::json!(7)));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        #[derive(Debug)]
        enum TestError {
            Boom,
            Cache,
        }
        impl From<CacheError> for TestError {
            fn from(_: CacheError) -> Self {
                TestError::Cache
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);

        let result: Result<String, TestError> =
            cache.get_or_fetch("k", || async { Err(TestError::Boom) }).await;
        assert!(matches!(result, Err(TestError::Boom)));
        assert!(!cache.path().exists());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_file_format_is_indented_entry_array() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .put("raw:profile:https://x", &serde_json::json!({"full_name": "Ada"}))
            .unwrap();

        let raw = std::fs::read_to_string(cache.path()).unwrap();
        assert!(raw.starts_with("[\n    {\n        \"cache_key\""));

        let parsed: Vec<CacheEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].cache_key, "raw:profile:https://x");
        assert_eq!(parsed[0].response["full_name"], "Ada");
    }

    #[test]
    fn test_duplicate_keys_first_occurrence_wins() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        std::fs::write(
            cache.path(),
            r#"[
                {"cache_key": "a", "response": 1},
                {"cache_key": "b", "response": 2},
                {"cache_key": "a", "response": 3}
            ]"#,
        )
        .unwrap();

        let table = cache.load();
        assert_eq!(table.len(), 2);
        assert_eq!(cache.get::<u32>("a"), Some(1));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        std::fs::write(
            cache.path(),
            r#"[{"linkedin_url": "old-format", "response": {}}, {"cache_key": "ok", "response": "v"}]"#,
        )
        .unwrap();

        assert_eq!(cache.get::<String>("ok").as_deref(), Some("v"));
        assert_eq!(cache.load().len(), 1);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_treated_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.put("k", &"not a number").unwrap();

        let value: u32 = cache
            .get_or_fetch("k", || async { Ok::<_, CacheError>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(cache.get::<u32>("k"), Some(42));
        assert_eq!(cache.load().len(), 1);
    }

    #[test]
    fn test_insert_preserves_order_and_replaces_in_place() {
        let mut table = CacheTable::default();
        table.insert("a".into(), serde_json::json!(1));
        table.insert("b".into(), serde_json::json!(2));
        table.insert("a".into(), serde_json::json!(3));

        let keys: Vec<&str> = table.entries.iter().map(|e| e.cache_key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(table.get("a"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_summary_key_depends_on_template_and_content() {
        let base = summary_key("website", "T {text}", "content");
        assert_eq!(base, summary_key("website", "T {text}", "content"));
        assert_ne!(base, summary_key("website", "T2 {text}", "content"));
        assert_ne!(base, summary_key("website", "T {text}", "other"));
        assert!(base.starts_with("summary:website:"));
        assert_ne!(raw_key("website", "https://a"), raw_key("profile", "https://a"));
    }
}

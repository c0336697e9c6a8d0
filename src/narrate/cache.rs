//! Summary cache keyed by metrics content and API key fingerprint.
//!
//! Entries are scoped to one key fingerprint: opening the cache with a
//! different fingerprint drops them. A separate last-good map, keyed by
//! content only, backs the fallback used when a request fails.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::NarrateError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    fingerprint: String,
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default)]
    last_good: BTreeMap<String, String>,
}

/// Short, non-reversible identifier of an API key.
pub fn key_fingerprint(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Hex sha256 of an arbitrary payload.
pub fn content_hash(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

#[derive(Debug)]
pub struct SummaryCache {
    path: Option<PathBuf>,
    fingerprint: String,
    entries: BTreeMap<String, String>,
    last_good: BTreeMap<String, String>,
}

impl SummaryCache {
    /// A cache that is never written to disk.
    pub fn in_memory(fingerprint: impl Into<String>) -> Self {
        Self {
            path: None,
            fingerprint: fingerprint.into(),
            entries: BTreeMap::new(),
            last_good: BTreeMap::new(),
        }
    }

    /// Open (or start) the cache file at `path` for `fingerprint`.
    pub fn open(path: &Path, fingerprint: impl Into<String>) -> Result<Self, NarrateError> {
        let fingerprint = fingerprint.into();
        let mut cache = Self::in_memory(fingerprint.clone());
        cache.path = Some(path.to_path_buf());

        if !path.exists() {
            return Ok(cache);
        }
        let text = std::fs::read_to_string(path).map_err(|e| cache_err(path, e))?;
        let file: CacheFile = match serde_json::from_str(&text) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("discarding unreadable summary cache {}: {e}", path.display());
                return Ok(cache);
            }
        };

        cache.last_good = file.last_good;
        if file.fingerprint == fingerprint {
            cache.entries = file.entries;
        } else {
            log::info!("API key changed; dropping {} cached summaries", file.entries.len());
        }
        Ok(cache)
    }

    /// Switch to another key fingerprint, dropping entries if it differs.
    pub fn set_fingerprint(&mut self, fingerprint: impl Into<String>) {
        let fingerprint = fingerprint.into();
        if fingerprint != self.fingerprint {
            self.entries.clear();
            self.fingerprint = fingerprint;
        }
    }

    /// Cache key for a request: content hash joined with the fingerprint.
    pub fn key(&self, content_hash: &str) -> String {
        format!("{content_hash}:{}", self.fingerprint)
    }

    pub fn get(&self, content_hash: &str) -> Option<&str> {
        self.entries.get(&self.key(content_hash)).map(String::as_str)
    }

    /// Last successful reply for this content under any key.
    pub fn last_good(&self, content_hash: &str) -> Option<&str> {
        self.last_good.get(content_hash).map(String::as_str)
    }

    pub fn insert(&mut self, content_hash: &str, text: &str) -> Result<(), NarrateError> {
        self.entries.insert(self.key(content_hash), text.to_string());
        self.last_good.insert(content_hash.to_string(), text.to_string());
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), NarrateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| cache_err(path, e))?;
        }
        let file = CacheFile {
            fingerprint: self.fingerprint.clone(),
            entries: self.entries.clone(),
            last_good: self.last_good.clone(),
        };
        let text = serde_json::to_string_pretty(&file).map_err(|e| cache_err(path, e))?;
        std::fs::write(path, text).map_err(|e| cache_err(path, e))
    }
}

fn cache_err(path: &Path, err: impl std::fmt::Display) -> NarrateError {
    NarrateError::Cache {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

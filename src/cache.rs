//! Offline shell cache.
//!
//! Keeps a copy of the page shell (markup, stylesheet, script, channel list)
//! and answers requests for it cache-first, going to the network only for
//! anything not stored. Native builds persist it with bincode so a later run
//! can start without a connection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info};

use crate::errors::TvError;

/// Bump when the shell changes so old copies are ignored
pub const SHELL_CACHE_NAME: &str = "tv-malaysia-v1";

pub const SHELL_ASSETS: [&str; 5] = [
    "/",
    "/index.html",
    "/styles.css",
    "/js/app.js",
    "/data/events.json",
];

/// Network side of the cache: fetch one asset by path.
pub trait AssetFetcher {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, TvError>>;
}

#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    pub base_url: String,
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, TvError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TvError::ServerError(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    Cache,
    Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellCache {
    pub name: String,
    entries: HashMap<String, Vec<u8>>,
}

impl ShellCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn is_installed(&self) -> bool {
        SHELL_ASSETS.iter().all(|p| self.entries.contains_key(*p))
    }

    pub fn lookup(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(|v| v.as_slice())
    }

    /// Fetch every shell asset. Either all of them land in the cache or the
    /// cache is left as it was.
    pub async fn install<F: AssetFetcher>(&mut self, fetcher: &F) -> Result<(), TvError> {
        let mut fetched = HashMap::with_capacity(SHELL_ASSETS.len());
        for path in SHELL_ASSETS {
            let body = fetcher.fetch(path).await?;
            fetched.insert(path.to_string(), body);
        }
        self.entries.extend(fetched);
        info!(cache = %self.name, assets = SHELL_ASSETS.len(), "shell cache installed");
        Ok(())
    }

    /// Cache-first answer for `path`.
    pub async fn respond<F: AssetFetcher>(
        &self,
        path: &str,
        fetcher: &F,
    ) -> Result<(Vec<u8>, Served), TvError> {
        if let Some(body) = self.lookup(path) {
            debug!(path, "served from shell cache");
            return Ok((body.to_vec(), Served::Cache));
        }
        let body = fetcher.fetch(path).await?;
        Ok((body, Served::Network))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn cache_path(&self) -> Option<std::path::PathBuf> {
        use directories::ProjectDirs;
        let proj = ProjectDirs::from("my", "tvmalaysia", "tv-malaysia")?;
        Some(proj.cache_dir().join(format!("{}.bin", self.name)))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), TvError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let encoded = bincode::serialize(self).map_err(|e| TvError::Config(e.to_string()))?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    /// Read a persisted cache. `None` if missing, corrupt, or stored under
    /// another cache name.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path, name: &str) -> Option<ShellCache> {
        let data = std::fs::read(path).ok()?;
        let cache: ShellCache = bincode::deserialize(&data).ok()?;
        if cache.name != name {
            return None;
        }
        Some(cache)
    }
}

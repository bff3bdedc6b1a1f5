use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_REMOTE_URL: &str =
    "https://raw.githubusercontent.com/kubernetes/kubernetes/{version}/api/openapi-spec/swagger.json";
pub const DEFAULT_VERSION: &str = "master";

#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    cache_dir: Option<PathBuf>,
    ttl: Duration,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(
        url_template: &str,
        version: &str,
        cache_dir: Option<PathBuf>,
        ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url_template.replace("{version}", version),
            cache_dir,
            ttl,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(cache_file_name(&self.url)))
    }

    /// Returns the cached document while it is younger than the TTL,
    /// otherwise downloads and caches it. Cache failures only cost the cache.
    pub async fn load(&self) -> Result<String> {
        let cache_path = self.cache_path();
        if let Some(path) = &cache_path {
            match read_fresh(path, self.ttl).await {
                Ok(Some(text)) => {
                    debug!(path = %path.display(), "remote schema cache hit");
                    return Ok(text);
                }
                Ok(None) => debug!(path = %path.display(), "remote schema cache miss"),
                Err(error) => warn!(error = %format!("{error:#}"), "ignoring unreadable schema cache"),
            }
        }

        let text = self.fetch().await?;
        if let Some(path) = &cache_path
            && let Err(error) = write_cache(path, &text).await
        {
            warn!(error = %format!("{error:#}"), "failed to cache remote schema");
        }
        Ok(text)
    }

    async fn fetch(&self) -> Result<String> {
        debug!(url = %self.url, "fetching remote schema");
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build http client")?;
        client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", self.url))?
            .error_for_status()
            .with_context(|| format!("failed to fetch {}", self.url))?
            .text()
            .await
            .with_context(|| format!("failed to read response from {}", self.url))
    }
}

pub fn cache_file_name(url: &str) -> String {
    format!("remote-{:x}", Sha256::digest(url.as_bytes()))
}

async fn read_fresh(path: &Path, ttl: Duration) -> Result<Option<String>> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(error).with_context(|| format!("failed to stat {}", path.display()));
        }
    };
    // an mtime in the future counts as fresh
    let age = metadata
        .modified()
        .with_context(|| format!("failed to read mtime of {}", path.display()))?
        .elapsed()
        .unwrap_or_default();
    if metadata.len() == 0 || age > ttl {
        return Ok(None);
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(text))
}

async fn write_cache(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::layout::DEFAULT_WRAP_WIDTH;
use crate::remote::DEFAULT_REMOTE_URL;

const CONFIG_ENV: &str = "KEXPLAIN_CONFIG";
const DEFAULT_CACHE_TTL_HOURS: u64 = 7 * 24;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KexplainConfig {
    pub wrap_width: usize,
    /// Extra resource names, mapped to a name the catalog knows.
    pub aliases: BTreeMap<String, String>,
    pub remote_url: String,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_hours: u64,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for KexplainConfig {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            aliases: BTreeMap::new(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            cache_dir: None,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            source: None,
        }
    }
}

impl KexplainConfig {
    /// Loads the first config file found, or the defaults when there is none.
    pub fn discover() -> Result<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let cwd = std::env::current_dir().context("failed to read working directory")?;
        match discover_config_path(std::env::var(CONFIG_ENV).ok(), &cwd, home.as_deref()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut parsed = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        };
        ensure!(
            parsed.wrap_width > 0,
            "wrap_width in {} must be positive",
            path.display()
        );
        parsed.source = Some(path.to_path_buf());
        Ok(parsed)
    }

    /// Configured cache directory, else `~/.config/kexplain/cache`.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config/kexplain/cache"))
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(60 * 60))
    }
}

fn discover_config_path(
    env_override: Option<String>,
    cwd: &Path,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = env_override
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        cwd.join("kexplain.yaml"),
        cwd.join("kexplain.yml"),
        cwd.join(".kexplain.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Some(home) = home {
        let user_candidates = [
            home.join(".config/kexplain/config.yaml"),
            home.join(".config/kexplain/config.yml"),
            home.join(".kexplain.yaml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

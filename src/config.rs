use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "upstream-watch.toml";

/// Configuration loaded from upstream-watch.toml and environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub publish: PublishConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Directory listing to scrape
    pub url: String,
    /// Source package name, the `<package>` in `<package>_<version><suffix>`
    pub package: String,
    pub suffix: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub git: String,
    pub remote: String,
    pub branch: String,
    pub user_name: String,
    pub user_email: String,
    /// Commit message; `{version}` is replaced with the published version
    pub message: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub dockerfile: PathBuf,
    pub readme: PathBuf,
    pub base_image: String,
    pub version_prefix: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: "https://deb.debian.org/debian/pool/main/a/apt-cacher-ng/".to_string(),
            package: "apt-cacher-ng".to_string(),
            suffix: ".orig.tar.xz".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            user_name: "github-actions[bot]".to_string(),
            user_email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
            message: "chore: update upstream version to {version}".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dockerfile: PathBuf::from("Dockerfile"),
            readme: PathBuf::from("README.md"),
            base_image: "ubuntu:jammy".to_string(),
            version_prefix: "v3.7.4-".to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PublishConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from upstream-watch.toml (or `$UPSTREAM_WATCH_CONFIG`)
    /// and environment variables. Environment variables take precedence over
    /// config file values.
    pub fn load() -> Result<Self> {
        let path = env::var("UPSTREAM_WATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from a variable lookup (env vars in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Probe
        if let Some(val) = lookup("UPSTREAM_WATCH_URL") {
            self.probe.url = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_PACKAGE") {
            self.probe.package = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_SUFFIX") {
            self.probe.suffix = val;
        }
        if let Some(n) = lookup("UPSTREAM_WATCH_HTTP_TIMEOUT")
            .and_then(|val| parse_timeout("UPSTREAM_WATCH_HTTP_TIMEOUT", &val))
        {
            self.probe.timeout_secs = n;
        }

        // Publish
        if let Some(val) = lookup("UPSTREAM_WATCH_GIT") {
            self.publish.git = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_REMOTE") {
            self.publish.remote = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_BRANCH") {
            self.publish.branch = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_GIT_USER_NAME") {
            self.publish.user_name = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_GIT_USER_EMAIL") {
            self.publish.user_email = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_COMMIT_MESSAGE") {
            self.publish.message = val;
        }
        if let Some(n) = lookup("UPSTREAM_WATCH_GIT_TIMEOUT")
            .and_then(|val| parse_timeout("UPSTREAM_WATCH_GIT_TIMEOUT", &val))
        {
            self.publish.timeout_secs = n;
        }

        // Sync
        if let Some(val) = lookup("UPSTREAM_WATCH_BASE_IMAGE") {
            self.sync.base_image = val;
        }
        if let Some(val) = lookup("UPSTREAM_WATCH_VERSION_PREFIX") {
            self.sync.version_prefix = val;
        }
    }
}

/// Timeout overrides must be a positive number of seconds; anything else is
/// ignored with a warning and the previous value stays.
fn parse_timeout(key: &str, val: &str) -> Option<u64> {
    match val.trim().parse::<u64>() {
        Ok(0) => {
            warn!(key, "ignoring zero timeout override");
            None
        }
        Ok(n) => Some(n),
        Err(e) => {
            warn!(key, value = val, error = %e, "ignoring non-numeric timeout override");
            None
        }
    }
}

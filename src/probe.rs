use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::listing::{latest, ListingEntry, ListingParser};
use crate::version::UpstreamVersion;

const USER_AGENT: &str = concat!("upstream-watch/", env!("CARGO_PKG_VERSION"));

/// Result of comparing the newest upstream archive with the version record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Upstream is ahead of the record (or there is no record yet)
    NewVersion {
        latest: ListingEntry,
        previous: Option<UpstreamVersion>,
    },
    /// The record already holds the newest upstream version
    UpToDate {
        latest: ListingEntry,
        current: UpstreamVersion,
    },
}

impl ProbeOutcome {
    pub fn latest(&self) -> &ListingEntry {
        match self {
            ProbeOutcome::NewVersion { latest, .. } | ProbeOutcome::UpToDate { latest, .. } => {
                latest
            }
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ProbeOutcome::NewVersion { .. })
    }
}

/// Fetch the directory listing page
pub async fn fetch_listing(url: &str, timeout: Duration) -> Result<String> {
    debug!(url, ?timeout, "fetching directory listing");

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        bail!("Failed to fetch {}: HTTP {}", url, response.status());
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read listing body from {}", url))
}

/// Read the version record. A missing or empty file means no version yet.
pub fn read_current(path: &Path) -> Result<Option<UpstreamVersion>> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content = content.trim();
    if content.is_empty() {
        return Ok(None);
    }

    let version = UpstreamVersion::parse(content).map_err(|source| ProbeError::InvalidRecord {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(version))
}

/// Decide whether `latest` is newer than the recorded version
pub fn decide(current: Option<UpstreamVersion>, latest: ListingEntry) -> ProbeOutcome {
    match current {
        Some(current) if latest.version.precedence_cmp(&current).is_le() => {
            ProbeOutcome::UpToDate { latest, current }
        }
        previous => ProbeOutcome::NewVersion { latest, previous },
    }
}

/// Overwrite the version record, creating parent directories as needed
pub fn write_record(path: &Path, version: &UpstreamVersion) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(path, version.as_str())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Parse a listing page, compare its newest archive with the version record,
/// and persist the new version unless `dry_run` is set.
pub fn evaluate(
    html: &str,
    config: &ProbeConfig,
    version_file: &Path,
    dry_run: bool,
) -> Result<ProbeOutcome> {
    let parser = ListingParser::new(&config.package, &config.suffix)?;
    let entries = parser.parse(html)?;
    debug!(candidates = entries.len(), "parsed listing");

    let newest = latest(entries).ok_or_else(|| ProbeError::NoCandidates {
        package: config.package.clone(),
        url: config.url.clone(),
    })?;

    let current = read_current(version_file)?;
    let outcome = decide(current, newest);

    if let ProbeOutcome::NewVersion { latest, previous } = &outcome {
        let previous = previous.as_ref().map(|v| v.to_string()).unwrap_or_default();
        info!(latest = %latest.version, %previous, "new upstream version");
        if !dry_run {
            write_record(version_file, &latest.version)?;
        }
    }

    Ok(outcome)
}

/// Fetch the configured listing and evaluate it against the version record
pub async fn probe(
    config: &ProbeConfig,
    version_file: &Path,
    dry_run: bool,
) -> Result<ProbeOutcome> {
    let html = fetch_listing(&config.url, config.timeout()).await?;
    evaluate(&html, config, version_file, dry_run)
}

//! Keeps README version references in step with the Dockerfile base image.
//!
//! The Dockerfile pins a dated base image (`FROM ubuntu:jammy-20240115`) and
//! the README advertises image tags built on it (`v3.7.4-20240115`). The date
//! is taken from the Dockerfile and written into every README reference,
//! whatever date those references carried before.

use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::SyncError;

/// Outcome of one synchronisation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub date: String,
    pub replacements: usize,
    /// Whether the README content differs after the rewrite
    pub changed: bool,
}

/// Find the `YYYYMMDD` date in `FROM <base_image>-YYYYMMDD`
pub fn extract_base_image_date(
    content: &str,
    base_image: &str,
    path: &Path,
) -> Result<String, SyncError> {
    let pattern = Regex::new(&format!(r"FROM\s+{}-(\d{{8}})", regex::escape(base_image)))?;

    pattern
        .captures(content)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| SyncError::DatePatternNotFound {
            base_image: base_image.to_string(),
            path: path.to_path_buf(),
        })
}

/// Replace the date after every `prefix` occurrence with `new_date`.
/// Returns the rewritten content and the number of occurrences.
pub fn rewrite_references(
    content: &str,
    prefix: &str,
    new_date: &str,
) -> Result<(String, usize), SyncError> {
    let pattern = Regex::new(&format!(r"({})(\d{{8}})", regex::escape(prefix)))?;

    let count = pattern.find_iter(content).count();
    let updated = pattern.replace_all(content, |caps: &Captures| {
        format!("{}{}", &caps[1], new_date)
    });

    Ok((updated.into_owned(), count))
}

/// Rewrite the references in a README file. The file is written back after
/// every successful rewrite unless `write` is false.
pub fn update_readme(
    path: &Path,
    prefix: &str,
    new_date: &str,
    write: bool,
) -> Result<(usize, bool), SyncError> {
    let content = read(path)?;
    let (updated, count) = rewrite_references(&content, prefix, new_date)?;
    let changed = updated != content;

    if write {
        fs::write(path, &updated).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    debug!(path = %path.display(), count, changed, write, "rewrote references");
    Ok((count, changed))
}

fn read(path: &Path) -> Result<String, SyncError> {
    fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the Dockerfile and README paths against a working directory
#[derive(Debug, Clone)]
pub struct ReferenceSync {
    dockerfile: PathBuf,
    readme: PathBuf,
    base_image: String,
    version_prefix: String,
}

impl ReferenceSync {
    pub fn new(config: &SyncConfig, workdir: &Path) -> Self {
        Self {
            dockerfile: workdir.join(&config.dockerfile),
            readme: workdir.join(&config.readme),
            base_image: config.base_image.clone(),
            version_prefix: config.version_prefix.clone(),
        }
    }

    pub fn readme(&self) -> &Path {
        &self.readme
    }

    pub fn version_prefix(&self) -> &str {
        &self.version_prefix
    }

    /// Both files must exist before anything is read or written
    pub fn check_files(&self) -> Result<(), SyncError> {
        for path in [&self.dockerfile, &self.readme] {
            if !path.exists() {
                return Err(SyncError::FileMissing(path.clone()));
            }
        }
        Ok(())
    }

    pub fn base_image_date(&self) -> Result<String, SyncError> {
        let content = read(&self.dockerfile)?;
        extract_base_image_date(&content, &self.base_image, &self.dockerfile)
    }

    /// Run the whole pass. With `write == false` the README is left untouched
    /// and the report says whether it would change.
    pub fn run(&self, write: bool) -> Result<SyncReport, SyncError> {
        self.check_files()?;
        let date = self.base_image_date()?;
        let (replacements, changed) =
            update_readme(&self.readme, &self.version_prefix, &date, write)?;

        Ok(SyncReport {
            date,
            replacements,
            changed,
        })
    }
}

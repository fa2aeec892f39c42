use std::path::PathBuf;
use thiserror::Error;

/// Failure to interpret a string as an upstream version
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,

    #[error("invalid epoch in version '{0}'")]
    InvalidEpoch(String),

    #[error("invalid release component '{component}' in version '{version}'")]
    InvalidRelease { version: String, component: String },

    #[error("invalid pre-release '{pre}' in version '{version}'")]
    InvalidPrerelease { version: String, pre: String },

    #[error("invalid build metadata '{build}' in version '{version}'")]
    InvalidBuild { version: String, build: String },
}

/// Failure to interpret a row of a directory listing
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing row for {filename} has no date cell")]
    MissingDate { filename: String },

    #[error("listing row for {filename} has malformed date '{value}'")]
    InvalidDate {
        filename: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid filename pattern")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no '{package}' archives matched in listing at {url}")]
    NoCandidates { package: String, url: String },

    #[error("version file {} holds an unparseable version", .path.display())]
    InvalidRecord {
        path: PathBuf,
        #[source]
        source: VersionError,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("version file not found: {}", .0.display())]
    VersionFileMissing(PathBuf),

    #[error("version file {} is empty", .0.display())]
    EmptyVersion(PathBuf),

    #[error("git executable '{0}' not found on PATH")]
    GitNotFound(String),

    #[error("failed to read version file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("`{command}` exited with {}", exit_status(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{} not found", .0.display())]
    FileMissing(PathBuf),

    #[error("Could not find {base_image} base image with date pattern in {}", .path.display())]
    DatePatternNotFound { base_image: String, path: PathBuf },

    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference pattern")]
    Pattern(#[from] regex::Error),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

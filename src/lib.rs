//! upstream-watch library - CI helpers for tracking upstream releases
//!
//! This library provides the core functionality for the `upstream-watch` CLI:
//! probing a package directory listing for new releases, publishing the
//! recorded version with git, and syncing README references to the Dockerfile
//! base image date.

pub mod commands;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod probe;
pub mod publish;
pub mod sync;
pub mod version;

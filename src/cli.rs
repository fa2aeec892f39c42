use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "upstream-watch")]
#[command(version)]
#[command(about = "CI helpers for tracking upstream releases")]
#[command(long_about = "upstream-watch detects new upstream source releases from a package \
directory listing, commits the recorded version to git, and keeps README image references \
in step with the Dockerfile base image.")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect a newer upstream release and record it (exit 0 = new, 1 = current)
    Probe {
        /// File holding the last recorded upstream version
        version_file: PathBuf,

        /// Directory listing URL
        #[arg(long, env = "UPSTREAM_WATCH_URL")]
        url: Option<String>,

        /// Source package name
        #[arg(short, long, env = "UPSTREAM_WATCH_PACKAGE")]
        package: Option<String>,

        /// Report without writing the version file
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Commit and push the version file
    Publish {
        /// File holding the version to publish
        version_file: PathBuf,

        /// Remote to push to
        #[arg(long, env = "UPSTREAM_WATCH_REMOTE")]
        remote: Option<String>,

        /// Remote branch to push to
        #[arg(long, env = "UPSTREAM_WATCH_BRANCH")]
        branch: Option<String>,
    },

    /// Rewrite README version references to the Dockerfile base image date
    SyncRefs {
        /// Dockerfile to read the base image date from
        #[arg(long)]
        dockerfile: Option<PathBuf>,

        /// README to rewrite
        #[arg(long)]
        readme: Option<PathBuf>,

        /// Do not write; exit 1 if the README is out of date
        #[arg(long)]
        check: bool,
    },

    /// Show version information
    Version,
}

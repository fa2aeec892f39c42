mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;
use std::process::ExitCode;

use upstream_watch::commands;
use upstream_watch::config::Config;
use upstream_watch::logging;

/// Config and working directory for the subcommands that touch the repo
fn load_context() -> Result<(Config, PathBuf)> {
    let config = Config::load()?;
    let workdir = std::env::current_dir().context("Failed to resolve working directory")?;
    Ok((config, workdir))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Probe {
            version_file,
            url,
            package,
            dry_run,
            json,
        } => {
            let (mut config, _) = load_context()?;
            if let Some(url) = url {
                config.probe.url = url;
            }
            if let Some(package) = package {
                config.probe.package = package;
            }
            commands::probe::run(&config.probe, &version_file, dry_run, json).await
        }
        Commands::Publish {
            version_file,
            remote,
            branch,
        } => {
            let (mut config, workdir) = load_context()?;
            if let Some(remote) = remote {
                config.publish.remote = remote;
            }
            if let Some(branch) = branch {
                config.publish.branch = branch;
            }
            commands::publish::run(&config.publish, &version_file, &workdir).await
        }
        Commands::SyncRefs {
            dockerfile,
            readme,
            check,
        } => {
            let (mut config, workdir) = load_context()?;
            if let Some(dockerfile) = dockerfile {
                config.sync.dockerfile = dockerfile;
            }
            if let Some(readme) = readme {
                config.sync.readme = readme;
            }
            commands::sync::run(&config.sync, &workdir, check)
        }
        Commands::Version => commands::version::run(),
    }
}

use anyhow::Result;
use colored::*;
use std::path::Path;
use std::process::ExitCode;

use crate::config::ProbeConfig;
use crate::probe::{self, ProbeOutcome};

/// Print the outcome and map it to the probe's exit status
pub fn report(
    outcome: &ProbeOutcome,
    config: &ProbeConfig,
    json_output: bool,
    dry_run: bool,
) -> Result<ExitCode> {
    let latest = outcome.latest();

    if json_output {
        let (current, updated) = match outcome {
            ProbeOutcome::NewVersion { previous, .. } => {
                (previous.as_ref().map(|v| v.to_string()), !dry_run)
            }
            ProbeOutcome::UpToDate { current, .. } => (Some(current.to_string()), false),
        };
        let output = serde_json::json!({
            "package": config.package,
            "latest": latest.version.to_string(),
            "current": current,
            "released": latest.released.format("%Y-%m-%d %H:%M").to_string(),
            "filename": latest.filename,
            "updated": updated,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match outcome {
            ProbeOutcome::NewVersion { latest, previous } => {
                let previous = previous
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "{} {} {}",
                    "New upstream version found:".green().bold(),
                    latest.version.to_string().green(),
                    format!("(previously {})", previous).dimmed()
                );
                println!(
                    "  {} released {}",
                    latest.filename,
                    latest.released.format("%Y-%m-%d %H:%M")
                );
                if dry_run {
                    println!("{}", "Dry run: version file not written".yellow());
                }
            }
            ProbeOutcome::UpToDate { current, .. } => {
                println!("Already at latest upstream version {}", current.to_string().cyan());
            }
        }
    }

    Ok(if outcome.is_new() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run the probe command
pub async fn run(
    config: &ProbeConfig,
    version_file: &Path,
    dry_run: bool,
    json_output: bool,
) -> Result<ExitCode> {
    if !json_output {
        println!(
            "Checking {} for new {} releases...",
            config.url.cyan(),
            config.package.bold()
        );
    }

    let outcome = probe::probe(config, version_file, dry_run).await?;
    report(&outcome, config, json_output, dry_run)
}

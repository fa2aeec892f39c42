use anyhow::Result;
use colored::*;
use std::path::Path;
use std::process::ExitCode;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::sync::ReferenceSync;

/// Run the sync-refs command
pub fn run(config: &SyncConfig, workdir: &Path, check: bool) -> Result<ExitCode> {
    let sync = ReferenceSync::new(config, workdir);

    let report = match sync.run(!check) {
        Ok(report) => report,
        Err(e @ (SyncError::FileMissing(_) | SyncError::DatePatternNotFound { .. })) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    println!("Found Ubuntu base image date: {}", report.date.cyan());

    let readme = config.readme.display();
    if check {
        if report.changed {
            eprintln!(
                "{} {} has stale version references; expected {}{}",
                "✗".red(),
                readme,
                sync.version_prefix(),
                report.date
            );
            return Ok(ExitCode::FAILURE);
        }
        println!("{} {} is up to date", "✓".green(), readme);
        return Ok(ExitCode::SUCCESS);
    }

    if report.replacements > 0 {
        println!(
            "Updated {} version reference(s) in {}",
            report.replacements.to_string().green(),
            readme
        );
        println!(
            "All versions now reference: {}",
            format!("{}{}", sync.version_prefix(), report.date).green()
        );
    } else {
        println!("No version references found to update");
    }

    Ok(ExitCode::SUCCESS)
}

use anyhow::Result;
use colored::*;
use std::path::Path;
use std::process::ExitCode;

use crate::config::PublishConfig;
use crate::error::PublishError;
use crate::publish::Publisher;

/// Run the publish command - commit and push the version file
pub async fn run(
    config: &PublishConfig,
    version_file: &Path,
    workdir: &Path,
) -> Result<ExitCode> {
    let publisher = Publisher::new(config, workdir);

    match publisher.publish(version_file).await {
        Ok(version) => {
            println!(
                "{} Published version {} to {}",
                "✓".green(),
                version.green(),
                publisher.target().cyan()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(PublishError::VersionFileMissing(path)) => {
            eprintln!("Error: version file {} not found", path.display());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            if let PublishError::CommandFailed { stdout, stderr, .. } = &e {
                if !stdout.trim().is_empty() {
                    println!("{}", "stdout:".bold());
                    println!("{}", stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    println!("{}", "stderr:".bold());
                    println!("{}", stderr.trim_end());
                }
            }
            eprintln!("{} Publish failed: {}", "✗".red(), e);
            Err(e.into())
        }
    }
}

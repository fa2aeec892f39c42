use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::PublishConfig;
use crate::error::PublishError;

/// Committer identity applied to every git invocation with `-c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    fn config_args(&self) -> [String; 4] {
        [
            "-c".to_string(),
            format!("user.name={}", self.name),
            "-c".to_string(),
            format!("user.email={}", self.email),
        ]
    }
}

/// One git invocation in the publish sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStep {
    pub args: Vec<String>,
}

impl GitStep {
    fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable form, without the identity overrides
    pub fn display(&self, git: &str) -> String {
        format!("{} {}", git, self.args.join(" "))
    }
}

/// Commits and pushes the version record
#[derive(Debug, Clone)]
pub struct Publisher {
    git: String,
    remote: String,
    branch: String,
    identity: Identity,
    message: String,
    timeout: Duration,
    workdir: PathBuf,
}

impl Publisher {
    pub fn new(config: &PublishConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            git: config.git.clone(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            identity: Identity {
                name: config.user_name.clone(),
                email: config.user_email.clone(),
            },
            message: config.message.clone(),
            timeout: config.timeout(),
            workdir: workdir.into(),
        }
    }

    /// Read the version string from the record, trimmed
    pub fn read_version(&self, version_file: &Path) -> Result<String, PublishError> {
        let path = self.workdir.join(version_file);
        if !path.exists() {
            return Err(PublishError::VersionFileMissing(version_file.to_path_buf()));
        }

        let content = fs::read_to_string(&path).map_err(|source| PublishError::Read {
            path: version_file.to_path_buf(),
            source,
        })?;
        let version = content.trim();
        if version.is_empty() {
            return Err(PublishError::EmptyVersion(version_file.to_path_buf()));
        }
        Ok(version.to_string())
    }

    pub fn commit_message(&self, version: &str) -> String {
        self.message.replace("{version}", version)
    }

    /// The ordered git sequence: stage, commit, push
    pub fn steps(&self, version_file: &Path, version: &str) -> Vec<GitStep> {
        vec![
            GitStep::new(["add".to_string(), version_file.display().to_string()]),
            GitStep::new(["commit".to_string(), "-m".to_string(), self.commit_message(version)]),
            GitStep::new([
                "push".to_string(),
                self.remote.clone(),
                format!("HEAD:{}", self.branch),
            ]),
        ]
    }

    /// Run a single step, failing on a non-zero exit status
    pub async fn run_step(&self, step: &GitStep) -> Result<Output, PublishError> {
        let command = step.display(&self.git);
        debug!(%command, "running git step");

        let mut cmd = Command::new(&self.git);
        cmd.args(self.identity.config_args())
            .args(&step.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(PublishError::Spawn { command, source }),
            Err(_) => {
                return Err(PublishError::Timeout {
                    command,
                    secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(PublishError::CommandFailed {
                command,
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output)
    }

    /// Commit and push the version record. Stops at the first failing step;
    /// steps that already ran are not undone.
    pub async fn publish(&self, version_file: &Path) -> Result<String, PublishError> {
        let version = self.read_version(version_file)?;

        if which::which(&self.git).is_err() {
            return Err(PublishError::GitNotFound(self.git.clone()));
        }

        for step in self.steps(version_file, &version) {
            println!("{} {}", "→".cyan(), step.display(&self.git));
            self.run_step(&step).await?;
        }

        Ok(version)
    }

    pub fn target(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

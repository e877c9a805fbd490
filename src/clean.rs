use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

/// Collaborator invoked before a group's cases when the clean marker is on.
/// Errors are reported to the runner, which logs them and keeps going.
#[async_trait]
pub trait CacheCleaner: Send + Sync {
    async fn clean(&self, target: &Path) -> Result<()>;
}

/// Cleans a build cache by running an external command with the target path
/// appended. Defaults to `cargo clean --manifest-path <target>`.
#[derive(Debug, Clone)]
pub struct CommandCleaner {
    program: String,
    args: Vec<String>,
}

impl CommandCleaner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parses a configured command line such as `"cargo clean --manifest-path"`.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut words = shell_words::split(line).context("invalid clean command")?;
        anyhow::ensure!(!words.is_empty(), "empty clean command");
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    /// True when `target` is the currently running executable. Cleaning the
    /// cache out from under ourselves would fail halfway through the run.
    fn is_self(target: &Path) -> bool {
        let Ok(current) = std::env::current_exe() else {
            return false;
        };
        let target = canonical(target);
        canonical(&current) == target
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl Default for CommandCleaner {
    fn default() -> Self {
        Self {
            program: "cargo".into(),
            args: vec!["clean".into(), "--manifest-path".into()],
        }
    }
}

#[async_trait]
impl CacheCleaner for CommandCleaner {
    async fn clean(&self, target: &Path) -> Result<()> {
        if Self::is_self(target) {
            info!(path = %target.display(), "skipping clean of the running executable");
            return Ok(());
        }

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .output()
            .await
            .with_context(|| format!("failed to run `{}`", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "`{}` exited with {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }
}

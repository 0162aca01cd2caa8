//! Invokes the external `git` executable.
//!
//! Everything that needs git output goes through the [`GitRunner`] trait so
//! the parsers and loaders can be driven by a scripted runner in tests.

use crate::error::GitError;
use crate::types::{Result, SuccessExitCodes};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

/// Environment variable consulted by [`GitCli::from_env`] for the git executable.
pub const GIT_EXECUTABLE_ENV: &str = "GITSTORE_GIT";

/// Output of a git invocation whose exit code was in the accepted set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub exit_code: i32,
    pub stdout: String,
}

/// Runs git with the given arguments in `cwd`.
///
/// `label` names the operation in errors and logs. An exit code outside
/// `success_codes` must be reported as `GitError::ToolInvocation`.
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(
        &self,
        args: &[String],
        cwd: &Path,
        label: &str,
        success_codes: &SuccessExitCodes,
    ) -> Result<GitOutput>;
}

/// Runs the real `git` executable as a child process.
#[derive(Debug, Clone)]
pub struct GitCli {
    executable: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl GitCli {
    /// Uses `git` from `PATH` with a non-interactive, untranslated environment.
    pub fn new() -> GitCli {
        GitCli {
            executable: PathBuf::from("git"),
            envs: vec![
                ("GIT_TERMINAL_PROMPT".into(), "0".into()),
                ("LC_ALL".into(), "C".into()),
            ],
        }
    }

    /// Like [`GitCli::new`], but honours `GITSTORE_GIT` when it is set.
    pub fn from_env() -> GitCli {
        let cli = GitCli::new();
        match std::env::var_os(GIT_EXECUTABLE_ENV) {
            Some(path) if !path.is_empty() => cli.with_executable(path),
            _ => cli,
        }
    }

    pub fn with_executable<P: Into<PathBuf>>(mut self, executable: P) -> GitCli {
        self.executable = executable.into();
        self
    }

    /// Adds an environment variable to every invocation.
    pub fn with_env<K: Into<OsString>, V: Into<OsString>>(mut self, key: K, value: V) -> GitCli {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Default for GitCli {
    fn default() -> Self {
        GitCli::new()
    }
}

#[async_trait]
impl GitRunner for GitCli {
    async fn run(
        &self,
        args: &[String],
        cwd: &Path,
        label: &str,
        success_codes: &SuccessExitCodes,
    ) -> Result<GitOutput> {
        debug!(label, cwd = %cwd.display(), ?args, "running git");

        let process_output = Command::new(&self.executable)
            .current_dir(cwd)
            .args(args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match process_output {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!(label, executable = %self.executable.display(), "git executable not found");
                return Err(GitError::GitNotFound);
            }
            Err(e) => {
                // Failed to even execute the command (e.g., permissions)
                error!(label, error = %e, "failed to execute git command");
                return Err(GitError::Execution {
                    label: label.to_string(),
                    source: e,
                });
            }
        };

        // Terminated by a signal
        let exit_code = output.status.code().unwrap_or(-1);

        if !success_codes.contains(exit_code) {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!(label, exit_code, %success_codes, "git exited with an unexpected code");
            return Err(GitError::ToolInvocation {
                label: label.to_string(),
                exit_code,
                stderr,
            });
        }

        // Paths are not guaranteed to be UTF-8.
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(GitOutput { exit_code, stdout })
    }
}

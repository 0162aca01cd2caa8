//! Provides the core Repository implementation: read-only git queries whose
//! output is routed through the status and log parsers.

use crate::error::ParseError;
use crate::log_parser::{parse_log, LOG_FORMAT};
use crate::models::{Commit, StatusResult};
use crate::runner::{GitCli, GitRunner};
use crate::status_parser::parse_porcelain_status;
use crate::types::{Result, SuccessExitCodes, FATAL_EXIT_CODE};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Represents a local Git repository located at a specific path.
///
/// Cloning a `Repository` is cheap; clones share the same runner.
#[derive(Clone)]
pub struct Repository {
    pub(crate) location: PathBuf,
    runner: Arc<dyn GitRunner>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Creates a `Repository` that runs the `git` executable configured by
    /// [`GitCli::from_env`].
    ///
    /// This does *not* check if the path is actually a valid Git repository.
    /// Operations will fail later if it's not.
    ///
    /// # Arguments
    /// * `p` - The path to the root of the working directory.
    pub fn new<P: AsRef<Path>>(p: P) -> Repository {
        Repository::with_runner(p, Arc::new(GitCli::from_env()))
    }

    /// Creates a `Repository` that invokes git through `runner`.
    pub fn with_runner<P: AsRef<Path>>(p: P, runner: Arc<dyn GitRunner>) -> Repository {
        Repository {
            location: PathBuf::from(p.as_ref()),
            runner,
        }
    }

    /// The root of the working directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Gets the branch state and working directory changes.
    ///
    /// Equivalent to `git status --untracked-files=all --branch --porcelain=2 -z`.
    ///
    /// # Errors
    /// Returns `GitError` if git exits with a non-zero code (including `128`
    /// outside a repository) or the output cannot be parsed.
    pub async fn get_status(&self) -> Result<StatusResult> {
        let args = strings(&["status", "--untracked-files=all", "--branch", "--porcelain=2", "-z"]);
        let output = self
            .runner
            .run(&args, &self.location, "get_status", &SuccessExitCodes::default())
            .await?;

        let items = parse_porcelain_status(&output.stdout)?;
        Ok(items.into_iter().collect())
    }

    /// Gets up to `limit` commits of `revision_range`, newest first, after
    /// skipping the first `skip` of them.
    ///
    /// Equivalent to `git log <revision_range> --date=raw --max-count=<limit>
    /// [--skip=<skip>] --pretty=... -z --no-color`.
    ///
    /// # Returns
    /// An empty list when `HEAD` is unborn (git exits with `128`).
    ///
    /// # Errors
    /// Returns `GitError` if git fails with any other code or the output
    /// cannot be parsed.
    pub async fn get_commits(
        &self,
        revision_range: &str,
        limit: usize,
        skip: Option<usize>,
    ) -> Result<Vec<Commit>> {
        let mut args = vec![
            "log".to_string(),
            revision_range.to_string(),
            "--date=raw".to_string(),
            format!("--max-count={}", limit),
        ];
        if let Some(skip) = skip {
            args.push(format!("--skip={}", skip));
        }
        args.push(format!("--pretty={}", LOG_FORMAT));
        args.extend(strings(&["-z", "--no-color"]));

        let output = self
            .runner
            .run(&args, &self.location, "get_commits", &SuccessExitCodes::allow_fatal())
            .await?;

        if output.exit_code == FATAL_EXIT_CODE {
            debug!(path = %self.location.display(), revision_range, "unborn HEAD, no commits");
            return Ok(Vec::new());
        }

        Ok(parse_log(&output.stdout)?)
    }

    /// Gets the commit `reference` resolves to.
    ///
    /// # Returns
    /// `None` if no matching commit was found.
    pub async fn get_commit(&self, reference: &str) -> Result<Option<Commit>> {
        let commits = self.get_commits(reference, 1, None).await?;
        Ok(commits.into_iter().next())
    }

    /// Gets the number of commits reachable from `HEAD`.
    ///
    /// Equivalent to `git rev-list --count HEAD`; an unborn `HEAD` counts as `0`.
    pub async fn get_commit_count(&self) -> Result<usize> {
        let args = strings(&["rev-list", "--count", "HEAD"]);
        let output = self
            .runner
            .run(&args, &self.location, "get_commit_count", &SuccessExitCodes::allow_fatal())
            .await?;

        // error code 128 is returned if the branch is unborn
        if output.exit_code == FATAL_EXIT_CODE {
            return Ok(0);
        }

        let count = output.stdout.trim();
        count
            .parse::<usize>()
            .map_err(|_| ParseError::CommitCount(count.to_string()).into())
    }

    /// Gets the absolute path to the top level working directory of the
    /// repository containing `dir_path`.
    ///
    /// Uses `git rev-parse --show-cdup` rather than `--show-toplevel` so that
    /// symlinks in the given path are kept.
    ///
    /// # Returns
    /// `None` if `dir_path` does not reside within a Git repository.
    pub async fn top_level_working_directory<P: AsRef<Path>>(
        runner: &dyn GitRunner,
        dir_path: P,
    ) -> Result<Option<PathBuf>> {
        let dir_path = dir_path.as_ref();
        let args = strings(&["rev-parse", "--show-cdup"]);
        let output = runner
            .run(
                &args,
                dir_path,
                "get_top_level_working_directory",
                &SuccessExitCodes::allow_fatal(),
            )
            .await?;

        // Exit code 128 means it was run in a directory that's not a Git repository.
        if output.exit_code == FATAL_EXIT_CODE {
            return Ok(None);
        }

        let relative_path = output.stdout.trim_end_matches(['\r', '\n']);
        if relative_path.is_empty() {
            return Ok(Some(dir_path.to_path_buf()));
        }

        Ok(Some(normalize(&dir_path.join(relative_path))))
    }

    /// Checks whether `dir_path` lies inside a Git working directory.
    pub async fn is_git_repository<P: AsRef<Path>>(runner: &dyn GitRunner, dir_path: P) -> Result<bool> {
        Ok(Self::top_level_working_directory(runner, dir_path).await?.is_some())
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Resolves `..` components lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    normalized
}

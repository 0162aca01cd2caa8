//! Keeps track of what a working copy has checked out.

use crate::error::GitError;
use crate::models::{Branch, BranchKind, RepositoryTip, StatusResult};
use crate::repository::Repository;
use crate::types::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// What a [`StatusRefresher`] is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    Idle,
    Refreshing,
}

#[derive(Debug, Default)]
struct RefresherInner {
    refreshing: bool,
    is_status_loaded: bool,
    tip: RepositoryTip,
    status: Option<StatusResult>,
    branches: Vec<Branch>,
}

/// Derives the [`RepositoryTip`] of one working copy from `git status`.
///
/// Only one refresh runs at a time; calling [`StatusRefresher::refresh_status`]
/// while a refresh is running does nothing.
#[derive(Debug)]
pub struct StatusRefresher {
    repository: Repository,
    inner: Mutex<RefresherInner>,
}

impl StatusRefresher {
    pub fn new(repository: Repository) -> StatusRefresher {
        StatusRefresher {
            repository,
            inner: Mutex::new(RefresherInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefresherInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> StatusPhase {
        if self.lock().refreshing {
            StatusPhase::Refreshing
        } else {
            StatusPhase::Idle
        }
    }

    /// Whether the last refresh succeeded.
    pub fn is_status_loaded(&self) -> bool {
        self.lock().is_status_loaded
    }

    pub fn tip(&self) -> RepositoryTip {
        self.lock().tip.clone()
    }

    /// The status from the last successful refresh.
    pub fn status(&self) -> Option<StatusResult> {
        self.lock().status.clone()
    }

    /// Branches seen so far.
    pub fn branches(&self) -> Vec<Branch> {
        self.lock().branches.clone()
    }

    /// Re-reads the status of the working copy and replaces the tip.
    ///
    /// # Errors
    /// Returns `GitError` if git fails, the output cannot be parsed, or the
    /// branch's commit cannot be found. The status is then marked as not
    /// loaded but the last known tip is kept.
    pub async fn refresh_status(&self) -> Result<()> {
        {
            let mut inner = self.lock();
            if inner.refreshing {
                debug!(path = %self.repository.location().display(), "status refresh already running");
                return Ok(());
            }
            inner.refreshing = true;
        }

        let refreshed = self.load_tip().await;

        let mut inner = self.lock();
        inner.refreshing = false;
        match refreshed {
            Ok((status, tip)) => {
                if let RepositoryTip::Valid { branch } = &tip {
                    upsert_branch(&mut inner.branches, branch.clone());
                }
                debug!(path = %self.repository.location().display(), ?tip, "refreshed status");
                inner.tip = tip;
                inner.status = Some(status);
                inner.is_status_loaded = true;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.repository.location().display(), error = %e, "failed to refresh status");
                inner.is_status_loaded = false;
                Err(e)
            }
        }
    }

    async fn load_tip(&self) -> Result<(StatusResult, RepositoryTip)> {
        let status = self.repository.get_status().await?;

        let tip = match (&status.branch_name, &status.branch_commit_id) {
            (Some(branch_name), Some(commit_id)) => {
                let tip = self
                    .repository
                    .get_commit(commit_id)
                    .await?
                    .ok_or_else(|| GitError::CommitNotFound(commit_id.clone()))?;
                RepositoryTip::Valid {
                    branch: Branch {
                        name: branch_name.clone(),
                        upstream: status.upstream_branch_name.clone(),
                        tip,
                        kind: BranchKind::Local,
                    },
                }
            }
            (None, Some(commit_id)) => RepositoryTip::Detached {
                commit_id: commit_id.clone(),
            },
            (Some(branch_name), None) => RepositoryTip::Unborn {
                reference: branch_name.clone(),
            },
            (None, None) => RepositoryTip::Unknown,
        };

        Ok((status, tip))
    }
}

/// Updates the local branch with the same name in place, or records a new one.
fn upsert_branch(branches: &mut Vec<Branch>, branch: Branch) {
    match branches
        .iter_mut()
        .find(|b| b.name == branch.name && b.kind == branch.kind)
    {
        Some(existing) => {
            existing.upstream = branch.upstream;
            existing.tip = branch.tip;
        }
        None => branches.push(branch),
    }
}

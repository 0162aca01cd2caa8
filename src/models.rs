//! Provides structured types representing Git data.

use chrono::{DateTime, Utc};

/// The author (or committer) of a commit as recorded by git.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
    /// When the commit was authored, at second resolution.
    pub date: DateTime<Utc>,
    /// Offset of the author's timezone from UTC, in minutes.
    pub tz_offset_minutes: i32,
}

/// Represents a Git commit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Commit {
    /// The full commit SHA.
    pub sha: String,
    /// First line of the commit message.
    pub summary: String,
    /// Commit message without the first line, trailing line breaks removed.
    pub body: String,
    pub author: CommitIdentity,
    /// SHAs of the parent commits, in the order git reports them.
    pub parent_shas: Vec<String>,
}

impl Commit {
    /// Whether this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parent_shas.len() > 1
    }
}

/// A changed, unmerged or untracked path from `git status`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEntry {
    /// The path to the file relative to the repository root.
    pub path: String,
    /// The two character long status code, e.g. `.M` or `??`.
    pub status_code: String,
    /// The original path of a renamed or copied file.
    pub old_path: Option<String>,
}

/// How far a branch has diverged from its upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchAheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

/// Represents the result of a `git status` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusResult {
    /// The current branch name, `None` when `HEAD` is detached.
    pub branch_name: Option<String>,
    /// Remote-prefixed upstream name, e.g. `origin/master`.
    pub upstream_branch_name: Option<String>,
    /// The commit `HEAD` points to, `None` on an unborn branch.
    pub branch_commit_id: Option<String>,
    pub branch_ahead_behind: Option<BranchAheadBehind>,
    /// The files in the working directory that differ from `HEAD`.
    pub entries: Vec<StatusEntry>,
}

/// Whether a branch lives in this repository or is a remote-tracking ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchKind {
    Local,
    Remote,
}

/// Represents a Git branch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Branch {
    /// Short name of the branch, e.g. `master`.
    pub name: String,
    /// Remote-prefixed upstream name, e.g. `origin/master`.
    pub upstream: Option<String>,
    /// Most recent commit on this branch.
    pub tip: Commit,
    pub kind: BranchKind,
}

/// What the working copy currently has checked out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepositoryTip {
    /// No status has been loaded yet.
    #[default]
    Unknown,
    /// `HEAD` points at a branch that has no commits yet.
    Unborn {
        /// Symbolic reference `HEAD` points to, typically `master` but orphan
        /// branches can be created externally.
        reference: String,
    },
    /// `HEAD` points directly at a commit.
    Detached { commit_id: String },
    /// `HEAD` points at a branch with at least one commit.
    Valid { branch: Branch },
}

impl RepositoryTip {
    /// The branch when the tip is `Valid`.
    pub fn branch(&self) -> Option<&Branch> {
        match self {
            RepositoryTip::Valid { branch } => Some(branch),
            _ => None,
        }
    }

    /// The commit id `HEAD` resolves to, if it resolves to one.
    pub fn commit_id(&self) -> Option<&str> {
        match self {
            RepositoryTip::Detached { commit_id } => Some(commit_id),
            RepositoryTip::Valid { branch } => Some(&branch.tip.sha),
            RepositoryTip::Unknown | RepositoryTip::Unborn { .. } => None,
        }
    }
}

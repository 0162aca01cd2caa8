//! Defines the error types used throughout the library.
use thiserror::Error;

/// Represents malformed output from the `git` executable.
///
/// Every variant carries the raw fragment that failed to parse so that a
/// mismatch between this parser and the installed git version can be diagnosed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `# branch.ab` header whose ahead and behind counts are both unparsable.
    #[error("Failed to parse status header: {0}")]
    StatusHeader(String),

    /// A `1 ...` record that does not have the ordinary changed entry layout.
    #[error("Failed to parse status line for changed entry: {0}")]
    ChangedEntry(String),

    /// A `2 ...` record that does not have the renamed/copied entry layout.
    #[error("Failed to parse status line for renamed or copied entry: {0}")]
    RenamedOrCopiedEntry(String),

    /// A `2 ...` record that was not followed by the original path field.
    #[error("Failed to parse renamed or copied entry, could not parse old path: {0}")]
    MissingOldPath(String),

    /// A `u ...` record that does not have the unmerged entry layout.
    #[error("Failed to parse status line for unmerged entry: {0}")]
    UnmergedEntry(String),

    /// A log record with fewer fields than the log format emits.
    #[error("Log record has {found} fields, expected {expected}: {record}")]
    LogRecord {
        record: String,
        found: usize,
        expected: usize,
    },

    /// An author identity that is not `NAME <EMAIL> SECONDS OFFSET`.
    #[error("Couldn't parse author identity {0}")]
    Identity(String),

    /// The output of `git rev-list --count` was not a number.
    #[error("Couldn't parse commit count {0:?}")]
    CommitCount(String),
}

/// Represents errors that can occur during Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Failed to spawn or wait on the external 'git' process.
    #[error("Unable to execute git process for {label}")]
    Execution {
        label: String,
        #[source]
        source: std::io::Error,
    },

    /// The 'git' executable was not found.
    #[error("'git' command not found. Please ensure Git is installed and that its executable is included in your system's PATH environment variable.")]
    GitNotFound,

    /// The 'git' command exited with a code outside the accepted set for the call.
    ///
    /// `stderr` is kept as git wrote it.
    #[error("git {label} failed with exit code {exit_code}: {}", .stderr.trim_end())]
    ToolInvocation {
        label: String,
        exit_code: i32,
        stderr: String,
    },

    /// The 'git' output could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A reference that should name a commit resolved to nothing.
    #[error("Failed to load commit {0}")]
    CommitNotFound(String),

    /// The peer of an IPC channel went away before answering.
    #[error("IPC channel {0} closed before a response was received")]
    IpcChannelClosed(String),
}

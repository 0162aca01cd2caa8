//! Defines small shared types: the crate `Result` and accepted exit codes.
use super::GitError;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::result::Result as stdResult;

/// A specialized `Result` type for Git operations.
pub type Result<A> = stdResult<A, GitError>;

/// Exit code git uses for fatal conditions such as an unborn `HEAD` or a
/// directory outside any repository.
pub const FATAL_EXIT_CODE: i32 = 128;

/// The set of exit codes an invocation treats as success.
///
/// Most commands only accept `0`; queries that give `128` a meaning of their
/// own (an unborn branch, not a repository) accept it as well and inspect
/// `GitOutput::exit_code` afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessExitCodes {
    codes: BTreeSet<i32>,
}

impl SuccessExitCodes {
    /// Accepts exactly the given codes.
    pub fn new<I: IntoIterator<Item = i32>>(codes: I) -> SuccessExitCodes {
        SuccessExitCodes {
            codes: codes.into_iter().collect(),
        }
    }

    /// Accepts `0` and `128`.
    pub fn allow_fatal() -> SuccessExitCodes {
        SuccessExitCodes::new([0, FATAL_EXIT_CODE])
    }

    pub fn contains(&self, code: i32) -> bool {
        self.codes.contains(&code)
    }
}

impl Default for SuccessExitCodes {
    fn default() -> Self {
        SuccessExitCodes::new([0])
    }
}

impl Display for SuccessExitCodes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.codes.iter().map(|c| c.to_string()).collect();
        write!(f, "{{{}}}", codes.join(", "))
    }
}

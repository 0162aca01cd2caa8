//! A Rust library that reads the state of git working copies by running the
//! `git` command-line tool and parsing its porcelain output.
//!
//! It parses `git status --porcelain=2` and `git log` records, derives which
//! branch or commit a working copy has checked out, and loads commit history
//! in batches so that large repositories can be shown incrementally.
//!
//! The `git` executable must be installed and on the `PATH`, or named by the
//! `GITSTORE_GIT` environment variable.
//!
//! # Examples
//!
//! ```no_run
//! use gitstore::GitStore;
//! use gitstore::models::RepositoryTip;
//!
//! # async fn run() -> gitstore::Result<()> {
//! let store = GitStore::new("./my_repo");
//! store.refresh().await?;
//!
//! match store.status().tip() {
//!     RepositoryTip::Valid { branch } => println!("On {} at {}", branch.name, branch.tip.sha),
//!     RepositoryTip::Unborn { reference } => println!("No commits yet on {}", reference),
//!     RepositoryTip::Detached { commit_id } => println!("Detached at {}", commit_id),
//!     RepositoryTip::Unknown => println!("Unknown state"),
//! }
//!
//! // Make sure at least 250 commits are loaded.
//! store.history().load_next_batch(Some(250)).await?;
//! for commit in store.history().commits(0..10) {
//!     println!("{} {}", &commit.sha[..7], commit.summary);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization of model and message structs using the `serde` crate.

pub mod error;
pub mod types;
pub mod models;
pub mod status_parser;
pub mod log_parser;
pub mod runner;
pub mod repository;
pub mod history;
pub mod status;
pub mod store;
pub mod ipc;

#[cfg(test)]
mod testing;

// Re-export key types
pub use crate::error::{GitError, ParseError};
pub use crate::history::{HistoryConfig, HistoryLoader};
pub use crate::repository::Repository;
pub use crate::runner::{GitCli, GitRunner};
pub use crate::status::StatusRefresher;
pub use crate::store::GitStore;
pub use crate::types::Result;

pub mod prelude {
    //! Convenient import for common gitstore types and traits.
    pub use crate::error::{GitError, ParseError};
    pub use crate::history::{HistoryConfig, HistoryLoader, HistoryPhase};
    pub use crate::repository::Repository;
    pub use crate::runner::{GitCli, GitRunner};
    pub use crate::status::{StatusPhase, StatusRefresher};
    pub use crate::store::GitStore;
    pub use crate::types::Result;
    pub use crate::models::*;
}

//! Bundles everything known about one working copy.

use crate::history::{HistoryConfig, HistoryLoader};
use crate::repository::Repository;
use crate::runner::GitRunner;
use crate::status::StatusRefresher;
use crate::types::Result;
use std::path::Path;
use std::sync::Arc;

/// Owns the history and status of a single working copy.
///
/// Create one per repository when it is selected and drop it when the
/// repository is deselected or removed. Stores for different repositories
/// share nothing and may load concurrently.
#[derive(Debug)]
pub struct GitStore {
    repository: Repository,
    history: HistoryLoader,
    status: StatusRefresher,
}

impl GitStore {
    /// Creates a store for the working copy at `local_path` using the `git`
    /// executable from the environment.
    pub fn new<P: AsRef<Path>>(local_path: P) -> GitStore {
        GitStore::from_repository(Repository::new(local_path), HistoryConfig::default())
    }

    /// Creates a store that invokes git through `runner`.
    pub fn with_runner<P: AsRef<Path>>(
        local_path: P,
        runner: Arc<dyn GitRunner>,
        config: HistoryConfig,
    ) -> GitStore {
        GitStore::from_repository(Repository::with_runner(local_path, runner), config)
    }

    pub fn from_repository(repository: Repository, config: HistoryConfig) -> GitStore {
        GitStore {
            history: HistoryLoader::with_config(repository.clone(), config),
            status: StatusRefresher::new(repository.clone()),
            repository,
        }
    }

    /// Absolute path to the root working directory of the repository.
    pub fn local_path(&self) -> &Path {
        self.repository.location()
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn history(&self) -> &HistoryLoader {
        &self.history
    }

    pub fn status(&self) -> &StatusRefresher {
        &self.status
    }

    /// Refreshes the status and reloads the newest history batch concurrently.
    ///
    /// Both run to completion; the first error is returned.
    pub async fn refresh(&self) -> Result<()> {
        let (status, history) =
            tokio::join!(self.status.refresh_status(), self.history.load_first_batch());
        status.and(history)
    }
}

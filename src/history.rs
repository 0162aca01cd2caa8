//! Loads the commit history of `HEAD` in batches.
//!
//! [`HistoryLoader`] keeps a gap-free, newest-first prefix of the history in
//! memory and extends it on demand. At most one fetch is in flight at a time;
//! requests that arrive while a fetch is running raise a watermark instead of
//! starting a second fetch, and the running fetch keeps going until the
//! watermark is met.

use crate::models::Commit;
use crate::repository::Repository;
use crate::types::Result;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Number of commits fetched per batch unless configured otherwise.
pub const HISTORY_BATCH_SIZE: usize = 100;

const HEAD: &str = "HEAD";

/// Tunables for a [`HistoryLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryConfig {
    /// Commits per batch; every fetch is a multiple of this. Zero is treated as one.
    pub batch_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            batch_size: HISTORY_BATCH_SIZE,
        }
    }
}

/// What a [`HistoryLoader`] is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPhase {
    Idle,
    LoadingFirstBatch,
    LoadingNextBatch,
}

/// The loaded part of a repository's history.
///
/// `commits()` is always a prefix of the full newest-first history of `HEAD`,
/// never longer than `total_count()`, and holds exactly the commits that can
/// be looked up by SHA.
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    commits_by_id: HashMap<String, Arc<Commit>>,
    ordered_commits: Vec<Arc<Commit>>,
    total_count: usize,
}

impl HistoryState {
    pub fn new() -> HistoryState {
        HistoryState::default()
    }

    /// Number of loaded commits.
    pub fn len(&self) -> usize {
        self.ordered_commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_commits.is_empty()
    }

    /// Number of commits reachable from `HEAD`, loaded or not.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.len() >= self.total_count
    }

    /// Loaded commits, most recent first.
    pub fn commits(&self) -> &[Arc<Commit>] {
        &self.ordered_commits
    }

    pub fn get(&self, sha: &str) -> Option<&Arc<Commit>> {
        self.commits_by_id.get(sha)
    }

    /// Throws away everything loaded and starts over from `commits`.
    pub(crate) fn replace(&mut self, total_count: usize, commits: Vec<Commit>) {
        self.commits_by_id.clear();
        self.ordered_commits.clear();
        self.total_count = total_count;
        self.merge(commits);
    }

    /// Appends the commits that are not loaded yet and returns how many were new.
    pub(crate) fn merge(&mut self, commits: Vec<Commit>) -> usize {
        let before = self.ordered_commits.len();
        for commit in commits {
            if self.commits_by_id.contains_key(&commit.sha) {
                continue;
            }
            let commit = Arc::new(commit);
            self.commits_by_id.insert(commit.sha.clone(), Arc::clone(&commit));
            self.ordered_commits.push(commit);
        }
        // History can grow between counting and fetching.
        self.total_count = self.total_count.max(self.ordered_commits.len());
        self.ordered_commits.len() - before
    }

    pub(crate) fn set_total_count(&mut self, total_count: usize) {
        if total_count < self.len() {
            warn!(
                total_count,
                loaded = self.len(),
                "history shrank below the loaded commits, reload the first batch"
            );
        }
        self.total_count = total_count.max(self.len());
    }
}

/// A next-batch fetch that has been committed to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BatchPlan {
    skip: usize,
    max_count: usize,
    /// The watermark when the fetch started.
    requested: usize,
    generation: u64,
}

#[derive(Debug, Default)]
struct LoaderInner {
    state: HistoryState,
    first_batch_loading: bool,
    next_batch_loading: bool,
    /// Highest "load at least this many" request not yet satisfied.
    min_requested_history_size: usize,
    /// Bumped whenever the state is replaced so that batches fetched against
    /// the old state are dropped.
    generation: u64,
}

impl LoaderInner {
    fn phase(&self) -> HistoryPhase {
        if self.first_batch_loading {
            HistoryPhase::LoadingFirstBatch
        } else if self.next_batch_loading {
            HistoryPhase::LoadingNextBatch
        } else {
            HistoryPhase::Idle
        }
    }

    fn request(&mut self, min_history_size: Option<usize>) {
        if let Some(min) = min_history_size {
            self.min_requested_history_size = self.min_requested_history_size.max(min);
        }
    }

    /// Decides whether a next batch should be fetched now, and marks it as
    /// loading if so.
    fn plan_next_batch(&mut self, batch_size: usize) -> Option<BatchPlan> {
        if self.first_batch_loading || self.next_batch_loading {
            // The running fetch picks up the watermark when it completes.
            return None;
        }

        let loaded = self.state.len();
        let requested = self.min_requested_history_size;
        if loaded >= self.state.total_count() || (requested > 0 && loaded >= requested) {
            self.min_requested_history_size = 0;
            return None;
        }

        let min_to_load = if requested == 0 {
            batch_size
        } else {
            requested - loaded
        };
        // Never ask for more than is left to load.
        let min_to_load = min_to_load.min(self.state.total_count() - loaded);

        let plan = BatchPlan {
            skip: loaded,
            max_count: min_to_load.div_ceil(batch_size).saturating_mul(batch_size),
            requested,
            generation: self.generation,
        };
        self.next_batch_loading = true;
        Some(plan)
    }

    /// Applies a successful first batch and decides whether to chain into a
    /// next batch straight away.
    fn finish_first_batch(
        &mut self,
        total_count: usize,
        commits: Vec<Commit>,
        batch_size: usize,
    ) -> Option<BatchPlan> {
        self.first_batch_loading = false;
        self.generation += 1;
        self.state.replace(total_count, commits);

        if self.state.len() < self.min_requested_history_size {
            self.plan_next_batch(batch_size)
        } else {
            self.min_requested_history_size = 0;
            None
        }
    }

    /// Applies a successful next batch and decides whether another one is
    /// needed to satisfy requests that arrived in the meantime.
    fn finish_next_batch(
        &mut self,
        plan: &BatchPlan,
        commits: Vec<Commit>,
        batch_size: usize,
    ) -> Option<BatchPlan> {
        self.next_batch_loading = false;

        if plan.generation != self.generation {
            debug!(skip = plan.skip, "dropping history batch fetched before a reload");
            if self.min_requested_history_size > self.state.len() {
                return self.plan_next_batch(batch_size);
            }
            self.settle();
            return None;
        }

        let added = self.state.merge(commits);
        let loaded = self.state.len();
        debug!(
            from = plan.skip,
            loaded,
            total = self.state.total_count(),
            "loaded history batch"
        );

        let should_load_next_batch = added > 0
            && loaded >= plan.requested
            && loaded < self.min_requested_history_size
            && loaded < self.state.total_count();

        if should_load_next_batch {
            self.plan_next_batch(batch_size)
        } else {
            self.settle();
            None
        }
    }

    fn fail_first_batch(&mut self) {
        self.first_batch_loading = false;
        self.settle();
    }

    fn fail_next_batch(&mut self) {
        self.next_batch_loading = false;
        self.settle();
    }

    /// Drops outstanding requests unless a first batch is still going to
    /// chain into them.
    fn settle(&mut self) {
        if !self.first_batch_loading {
            self.min_requested_history_size = 0;
        }
    }
}

/// Progressively loads the history of one working copy.
///
/// All methods take `&self`; the loader is meant to be shared by the tasks
/// that need history (e.g. behind an `Arc`). The internal lock is only held
/// for bookkeeping, never while git runs.
#[derive(Debug)]
pub struct HistoryLoader {
    repository: Repository,
    batch_size: usize,
    inner: Mutex<LoaderInner>,
}

impl HistoryLoader {
    pub fn new(repository: Repository) -> HistoryLoader {
        HistoryLoader::with_config(repository, HistoryConfig::default())
    }

    pub fn with_config(repository: Repository, config: HistoryConfig) -> HistoryLoader {
        HistoryLoader {
            repository,
            batch_size: config.batch_size.max(1),
            inner: Mutex::new(LoaderInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn phase(&self) -> HistoryPhase {
        self.lock().phase()
    }

    /// Number of commits currently loaded.
    pub fn loaded_count(&self) -> usize {
        self.lock().state.len()
    }

    /// Number of commits reachable from `HEAD` as of the last count.
    pub fn total_count(&self) -> usize {
        self.lock().state.total_count()
    }

    /// Whether the commit at `index` (0 is the newest) is loaded.
    pub fn is_loaded(&self, index: usize) -> bool {
        index < self.loaded_count()
    }

    pub fn commit(&self, sha: &str) -> Option<Arc<Commit>> {
        self.lock().state.get(sha).cloned()
    }

    pub fn commit_at(&self, index: usize) -> Option<Arc<Commit>> {
        self.lock().state.commits().get(index).cloned()
    }

    /// The loaded commits in `range`, clamped to what is loaded.
    pub fn commits(&self, range: Range<usize>) -> Vec<Arc<Commit>> {
        let inner = self.lock();
        let commits = inner.state.commits();
        let end = range.end.min(commits.len());
        let start = range.start.min(end);
        commits[start..end].to_vec()
    }

    /// A copy of the loaded history.
    pub fn snapshot(&self) -> HistoryState {
        self.lock().state.clone()
    }

    /// Re-counts the commits reachable from `HEAD` without loading any.
    pub async fn refresh_total_count(&self) -> Result<usize> {
        let total = self.repository.get_commit_count().await?;
        let mut inner = self.lock();
        inner.state.set_total_count(total);
        Ok(inner.state.total_count())
    }

    /// Counts the history and loads its newest batch, replacing anything
    /// loaded before.
    ///
    /// Does nothing if a first batch is already loading. If more history was
    /// requested in the meantime, continues with next batches before returning.
    ///
    /// # Errors
    /// Returns `GitError` if git fails; the previously loaded history is kept.
    pub async fn load_first_batch(&self) -> Result<()> {
        {
            let mut inner = self.lock();
            if inner.first_batch_loading {
                debug!(path = %self.repository.location().display(), "first history batch already loading");
                return Ok(());
            }
            inner.first_batch_loading = true;
        }

        let fetched = self.fetch_first_batch().await;

        let plan = {
            let mut inner = self.lock();
            match fetched {
                Ok((total_count, commits)) => {
                    inner.finish_first_batch(total_count, commits, self.batch_size)
                }
                Err(e) => {
                    inner.fail_first_batch();
                    warn!(path = %self.repository.location().display(), error = %e, "failed to load first history batch");
                    return Err(e);
                }
            }
        };

        match plan {
            Some(plan) => self.run_next_batches(plan).await,
            None => Ok(()),
        }
    }

    /// Loads the batch after the last loaded commit.
    ///
    /// With `min_history_size`, loads as many whole batches as needed for at
    /// least that many commits to be loaded. While another load is running
    /// the request is recorded and the call returns immediately; the running
    /// load satisfies it before finishing.
    ///
    /// # Errors
    /// Returns `GitError` if git fails; already loaded commits are kept.
    pub async fn load_next_batch(&self, min_history_size: Option<usize>) -> Result<()> {
        let plan = {
            let mut inner = self.lock();
            inner.request(min_history_size);
            inner.plan_next_batch(self.batch_size)
        };

        match plan {
            Some(plan) => self.run_next_batches(plan).await,
            None => Ok(()),
        }
    }

    async fn fetch_first_batch(&self) -> Result<(usize, Vec<Commit>)> {
        let total_count = self.repository.get_commit_count().await?;
        // Load commits in reverse chronological order.
        let commits = self
            .repository
            .get_commits(HEAD, self.batch_size, None)
            .await?;
        debug!(
            path = %self.repository.location().display(),
            total_count,
            loaded = commits.len(),
            "loaded first history batch"
        );
        Ok((total_count, commits))
    }

    async fn run_next_batches(&self, mut plan: BatchPlan) -> Result<()> {
        loop {
            debug!(
                path = %self.repository.location().display(),
                skip = plan.skip,
                max_count = plan.max_count,
                "loading history batch"
            );
            let fetched = self
                .repository
                .get_commits(HEAD, plan.max_count, Some(plan.skip))
                .await;

            let next = {
                let mut inner = self.lock();
                match fetched {
                    Ok(commits) => inner.finish_next_batch(&plan, commits, self.batch_size),
                    Err(e) => {
                        inner.fail_next_batch();
                        warn!(path = %self.repository.location().display(), error = %e, "failed to load history batch");
                        return Err(e);
                    }
                }
            };

            match next {
                Some(next) => plan = next,
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitError;
    use crate::log_parser::parse_identity;
    use crate::testing::FakeGit;

    fn commit(sha: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            summary: format!("commit {}", sha),
            body: String::new(),
            author: parse_identity("Jane Doe <jane@x.com> 1609459200 +0000").unwrap(),
            parent_shas: Vec::new(),
        }
    }

    fn commits(shas: &[&str]) -> Vec<Commit> {
        shas.iter().map(|s| commit(s)).collect()
    }

    fn loader(git: &Arc<FakeGit>) -> HistoryLoader {
        HistoryLoader::new(Repository::with_runner("/repo", git.clone()))
    }

    fn log_limits(git: &FakeGit) -> Vec<(String, String)> {
        git.calls()
            .into_iter()
            .filter(|(label, _)| label == "get_commits")
            .map(|(_, args)| {
                let find = |prefix: &str| {
                    args.iter()
                        .find(|a| a.starts_with(prefix))
                        .cloned()
                        .unwrap_or_default()
                };
                (find("--max-count="), find("--skip="))
            })
            .collect()
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut state = HistoryState::new();
        state.replace(10, commits(&["a", "b"]));
        assert_eq!(state.merge(commits(&["b", "c"])), 1);
        assert_eq!(state.merge(commits(&["a", "b", "c"])), 0);

        let shas: Vec<&str> = state.commits().iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["a", "b", "c"]);
        assert!(state.get("c").is_some());
        assert_eq!(state.total_count(), 10);
    }

    #[test]
    fn test_total_never_below_loaded() {
        let mut state = HistoryState::new();
        state.replace(1, commits(&["a", "b"]));
        assert_eq!(state.total_count(), 2);
        state.set_total_count(0);
        assert_eq!(state.total_count(), 2);
        assert!(state.is_fully_loaded());
    }

    #[test]
    fn test_plan_rounds_up_to_whole_batches() {
        let mut inner = LoaderInner::default();
        inner.state.set_total_count(1000);
        inner.request(Some(250));
        let plan = inner.plan_next_batch(100).unwrap();
        assert_eq!(plan.skip, 0);
        assert_eq!(plan.max_count, 300);
        assert_eq!(inner.phase(), HistoryPhase::LoadingNextBatch);

        // Exact multiples are not rounded past.
        let mut inner = LoaderInner::default();
        inner.state.set_total_count(1000);
        inner.request(Some(200));
        assert_eq!(inner.plan_next_batch(100).unwrap().max_count, 200);
    }

    #[test]
    fn test_plan_is_bounded_by_remaining_history() {
        let mut inner = LoaderInner::default();
        inner.state.replace(1000, commits(&["a", "b"]));
        inner.request(Some(usize::MAX));
        let plan = inner.plan_next_batch(64).unwrap();
        assert_eq!(plan.skip, 2);
        // 998 left, rounded to whole batches.
        assert_eq!(plan.max_count, 1024);
        assert_eq!(inner.phase(), HistoryPhase::LoadingNextBatch);
    }

    #[test]
    fn test_plan_while_busy_folds_watermark() {
        let mut inner = LoaderInner::default();
        inner.state.set_total_count(1000);
        inner.first_batch_loading = true;
        inner.request(Some(150));
        inner.request(Some(120));
        assert_eq!(inner.plan_next_batch(100), None);
        assert_eq!(inner.min_requested_history_size, 150);
    }

    #[test]
    fn test_plan_when_satisfied_or_exhausted() {
        let mut inner = LoaderInner::default();
        inner.state.replace(3, commits(&["a", "b", "c"]));
        assert_eq!(inner.plan_next_batch(100), None);

        inner.state.set_total_count(10);
        inner.request(Some(2));
        assert_eq!(inner.plan_next_batch(100), None);
        assert_eq!(inner.min_requested_history_size, 0);
        assert_eq!(inner.phase(), HistoryPhase::Idle);
    }

    #[test]
    fn test_stale_batch_is_dropped_after_reload() {
        let mut inner = LoaderInner::default();
        inner.state.replace(4, commits(&["a", "b"]));
        let plan = inner.plan_next_batch(2).unwrap();

        // A reload lands while the next batch is in flight.
        inner.first_batch_loading = true;
        assert_eq!(inner.finish_first_batch(4, commits(&["x", "y"]), 2), None);

        let next = inner.finish_next_batch(&plan, commits(&["c", "d"]), 2);
        let shas: Vec<&str> = inner.state.commits().iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["x", "y"]);
        // Nothing was requested beyond the first batch.
        assert_eq!(next, None);
        assert_eq!(inner.phase(), HistoryPhase::Idle);
    }

    #[test]
    fn test_empty_batch_stops_the_chain() {
        let mut inner = LoaderInner::default();
        inner.state.replace(10, commits(&["a"]));
        inner.request(Some(5));
        let plan = inner.plan_next_batch(2).unwrap();
        assert_eq!(inner.finish_next_batch(&plan, Vec::new(), 2), None);
        assert_eq!(inner.min_requested_history_size, 0);
    }

    #[tokio::test]
    async fn test_load_first_batch() {
        let git = FakeGit::with_history(250);
        let loader = loader(&git);

        loader.load_first_batch().await.unwrap();
        assert_eq!(loader.total_count(), 250);
        assert_eq!(loader.loaded_count(), 100);
        assert_eq!(loader.commit_at(0).unwrap().sha, FakeGit::sha(0));
        assert_eq!(loader.commit_at(99).unwrap().sha, FakeGit::sha(99));
        assert!(loader.commit(&FakeGit::sha(42)).is_some());
        assert!(!loader.is_loaded(100));
        assert_eq!(loader.phase(), HistoryPhase::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_first_batches_fetch_once() {
        let git = FakeGit::with_history(250);
        let loader = loader(&git);

        let (a, b) = tokio::join!(loader.load_first_batch(), loader.load_first_batch());
        a.unwrap();
        b.unwrap();

        assert_eq!(git.call_count("get_commit_count"), 1);
        assert_eq!(git.call_count("get_commits"), 1);
        assert_eq!(loader.loaded_count(), 100);
    }

    #[tokio::test]
    async fn test_next_batch_appends_without_refetching() {
        let git = FakeGit::with_history(250);
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();

        loader.load_next_batch(None).await.unwrap();
        assert_eq!(loader.loaded_count(), 200);
        loader.load_next_batch(None).await.unwrap();
        assert_eq!(loader.loaded_count(), 250);
        // Everything is loaded, no further fetch.
        loader.load_next_batch(None).await.unwrap();

        assert_eq!(
            log_limits(&git),
            vec![
                ("--max-count=100".to_string(), String::new()),
                ("--max-count=100".to_string(), "--skip=100".to_string()),
                ("--max-count=100".to_string(), "--skip=200".to_string()),
            ]
        );

        let snapshot = loader.snapshot();
        for (i, commit) in snapshot.commits().iter().enumerate() {
            assert_eq!(commit.sha, FakeGit::sha(i));
        }
    }

    #[tokio::test]
    async fn test_min_history_size_is_one_fetch() {
        let git = FakeGit::with_history(1000);
        let loader = loader(&git);
        assert_eq!(loader.refresh_total_count().await.unwrap(), 1000);

        loader.load_next_batch(Some(250)).await.unwrap();
        assert_eq!(loader.loaded_count(), 300);
        assert_eq!(
            log_limits(&git),
            vec![("--max-count=300".to_string(), "--skip=0".to_string())]
        );
    }

    #[tokio::test]
    async fn test_load_everything() {
        let git = FakeGit::with_history(1000);
        let loader = loader(&git);
        loader.refresh_total_count().await.unwrap();

        loader.load_next_batch(Some(usize::MAX)).await.unwrap();
        assert_eq!(loader.loaded_count(), 1000);
        assert_eq!(loader.phase(), HistoryPhase::Idle);
        assert_eq!(
            log_limits(&git),
            vec![("--max-count=1000".to_string(), "--skip=0".to_string())]
        );

        // The watermark was cleared; nothing is left to fetch.
        loader.load_next_batch(None).await.unwrap();
        assert_eq!(git.call_count("get_commits"), 1);
    }

    #[tokio::test]
    async fn test_request_during_first_batch_chains() {
        let git = FakeGit::with_history(1000);
        let loader = loader(&git);

        let (first, next) = tokio::join!(loader.load_first_batch(), loader.load_next_batch(Some(250)));
        first.unwrap();
        next.unwrap();

        assert_eq!(loader.loaded_count(), 300);
        assert_eq!(
            log_limits(&git),
            vec![
                ("--max-count=100".to_string(), String::new()),
                ("--max-count=200".to_string(), "--skip=100".to_string()),
            ]
        );
        assert_eq!(loader.phase(), HistoryPhase::Idle);
    }

    #[tokio::test]
    async fn test_watermark_raised_during_next_batch() {
        let git = FakeGit::with_history(1000);
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();

        let (a, b) = tokio::join!(loader.load_next_batch(None), loader.load_next_batch(Some(450)));
        a.unwrap();
        b.unwrap();

        assert_eq!(loader.loaded_count(), 500);
        assert_eq!(git.call_count("get_commits"), 3);
    }

    #[tokio::test]
    async fn test_loaded_history_is_monotonic() {
        let git = FakeGit::with_history(730);
        let loader = HistoryLoader::with_config(
            Repository::with_runner("/repo", git.clone()),
            HistoryConfig { batch_size: 64 },
        );
        loader.load_first_batch().await.unwrap();

        let mut previous = loader.loaded_count();
        for min in [None, Some(10), Some(300), None, Some(299), Some(2000), None] {
            loader.load_next_batch(min).await.unwrap();
            let loaded = loader.loaded_count();
            assert!(loaded >= previous);
            assert!(loaded <= loader.total_count());
            assert!(loaded % 64 == 0 || loaded == 730);
            previous = loaded;
        }
        assert_eq!(previous, 730);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_state_and_allows_retry() {
        let git = FakeGit::with_history(300);
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();

        git.fail_next("get_commits", 1);
        let err = loader.load_next_batch(None).await.unwrap_err();
        assert!(matches!(err, GitError::ToolInvocation { exit_code: 1, .. }));
        assert_eq!(loader.loaded_count(), 100);
        assert_eq!(loader.phase(), HistoryPhase::Idle);

        loader.load_next_batch(None).await.unwrap();
        assert_eq!(loader.loaded_count(), 200);
    }

    #[tokio::test]
    async fn test_failed_first_batch_keeps_previous_history() {
        let git = FakeGit::with_history(150);
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();

        git.fail_next("get_commit_count", 2);
        assert!(loader.load_first_batch().await.is_err());
        assert_eq!(loader.loaded_count(), 100);
        assert_eq!(loader.phase(), HistoryPhase::Idle);
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_commits() {
        let git = FakeGit::with_history(50);
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();
        assert_eq!(loader.loaded_count(), 50);

        git.set_history_len(80);
        loader.load_first_batch().await.unwrap();
        assert_eq!(loader.total_count(), 80);
        assert_eq!(loader.loaded_count(), 80);
    }

    #[tokio::test]
    async fn test_unborn_history_is_empty() {
        let git = FakeGit::unborn();
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();
        loader.load_next_batch(Some(500)).await.unwrap();

        assert_eq!(loader.total_count(), 0);
        assert_eq!(loader.loaded_count(), 0);
        assert_eq!(git.call_count("get_commits"), 1);
        assert!(loader.commits(0..10).is_empty());
    }

    #[tokio::test]
    async fn test_commits_range_is_clamped() {
        let git = FakeGit::with_history(30);
        let loader = loader(&git);
        loader.load_first_batch().await.unwrap();

        assert_eq!(loader.commits(25..40).len(), 5);
        assert_eq!(loader.commits(40..50).len(), 0);
        assert_eq!(loader.commits(0..3)[2].sha, FakeGit::sha(2));
    }
}

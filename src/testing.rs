//! A scripted stand-in for the git executable, shared by the unit tests.

use crate::error::GitError;
use crate::log_parser::FIELD_DELIMITER;
use crate::runner::{GitOutput, GitRunner};
use crate::types::{Result, SuccessExitCodes, FATAL_EXIT_CODE};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Serves a synthetic linear history of `len` commits, newest first, where
/// commit `i` has parent `i + 1`.
///
/// Every call yields to the scheduler once before answering, so futures
/// joined together overlap the way they would against a real process.
pub(crate) struct FakeGit {
    len: Mutex<usize>,
    unborn: bool,
    status: Mutex<String>,
    count_output: Mutex<Option<String>>,
    cdup_output: Mutex<Option<String>>,
    failures: Mutex<HashMap<String, i32>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeGit {
    pub(crate) fn with_history(len: usize) -> Arc<FakeGit> {
        Arc::new(FakeGit::build(len, false))
    }

    /// A repository whose `HEAD` has no commits.
    pub(crate) fn unborn() -> Arc<FakeGit> {
        Arc::new(FakeGit::build(0, true))
    }

    fn build(len: usize, unborn: bool) -> FakeGit {
        FakeGit {
            len: Mutex::new(len),
            unborn,
            status: Mutex::new(String::new()),
            count_output: Mutex::new(None),
            cdup_output: Mutex::new(Some("\n".to_string())),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// SHA of the commit at `index`, counting from the newest.
    pub(crate) fn sha(index: usize) -> String {
        format!("{:040x}", index + 1)
    }

    pub(crate) fn set_status(&self, output: &str) {
        *self.status.lock().unwrap() = output.to_string();
    }

    pub(crate) fn set_count_output(&self, output: &str) {
        *self.count_output.lock().unwrap() = Some(output.to_string());
    }

    /// `None` makes `rev-parse` behave as outside a repository.
    pub(crate) fn set_cdup_output(&self, output: Option<&str>) {
        *self.cdup_output.lock().unwrap() = output.map(str::to_string);
    }

    /// Grows or shrinks the history without touching existing SHAs' order.
    pub(crate) fn set_history_len(&self, len: usize) {
        *self.len.lock().unwrap() = len;
    }

    /// Makes the next call with `label` exit with `exit_code`.
    pub(crate) fn fail_next(&self, label: &str, exit_code: i32) {
        self.failures
            .lock()
            .unwrap()
            .insert(label.to_string(), exit_code);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, label: &str) -> usize {
        self.calls().iter().filter(|(l, _)| l == label).count()
    }

    fn flag_value(args: &[String], flag: &str) -> Option<usize> {
        args.iter()
            .find_map(|a| a.strip_prefix(flag))
            .and_then(|v| v.parse().ok())
    }

    fn log_output(&self, args: &[String]) -> String {
        let len = *self.len.lock().unwrap();
        let range = args.get(1).map(String::as_str).unwrap_or("HEAD");
        let start = if range == "HEAD" {
            0
        } else {
            match (0..len).find(|i| FakeGit::sha(*i) == range) {
                Some(i) => i,
                None => return String::new(),
            }
        };
        let skip = FakeGit::flag_value(args, "--skip=").unwrap_or(0);
        let max = FakeGit::flag_value(args, "--max-count=").unwrap_or(usize::MAX);

        let mut out = String::new();
        for i in (start + skip..len).take(max) {
            let parent = if i + 1 < len { FakeGit::sha(i + 1) } else { String::new() };
            let fields = [
                FakeGit::sha(i),
                format!("Commit number {}", len - i),
                String::new(),
                format!("Jane Doe <jane@x.com> {} +0100", 1_600_000_000 + (len - i) as i64),
                parent,
            ];
            out.push_str(&fields.join(&FIELD_DELIMITER.to_string()));
            out.push('\0');
        }
        out
    }
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(
        &self,
        args: &[String],
        _cwd: &Path,
        label: &str,
        success_codes: &SuccessExitCodes,
    ) -> Result<GitOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((label.to_string(), args.to_vec()));
        tokio::task::yield_now().await;

        let exit = |exit_code: i32, stdout: String| {
            if success_codes.contains(exit_code) {
                Ok(GitOutput { exit_code, stdout })
            } else {
                Err(GitError::ToolInvocation {
                    label: label.to_string(),
                    exit_code,
                    stderr: format!("fatal: scripted failure {}", exit_code),
                })
            }
        };

        if let Some(code) = self.failures.lock().unwrap().remove(label) {
            return exit(code, String::new());
        }

        match args.first().map(String::as_str) {
            Some("status") => exit(0, self.status.lock().unwrap().clone()),
            Some("log") if self.unborn => exit(FATAL_EXIT_CODE, String::new()),
            Some("log") => exit(0, self.log_output(args)),
            Some("rev-list") if self.unborn => exit(FATAL_EXIT_CODE, String::new()),
            Some("rev-list") => {
                let output = self.count_output.lock().unwrap().clone();
                let len = *self.len.lock().unwrap();
                exit(0, output.unwrap_or_else(|| format!("{}\n", len)))
            }
            Some("rev-parse") => match self.cdup_output.lock().unwrap().clone() {
                Some(cdup) => exit(0, cdup),
                None => exit(FATAL_EXIT_CODE, String::new()),
            },
            _ => exit(1, String::new()),
        }
    }
}

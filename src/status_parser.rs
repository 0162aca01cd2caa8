//! Parses the output of `git status --porcelain=2 --branch -z`.
//!
//! Each record is terminated by a NUL byte. Header records start with `# `,
//! every other record is discriminated by its leading marker character and has
//! a fixed number of space separated fields before the path. The path is
//! always the last field, so it may contain spaces and newlines.
//!
//! See <https://git-scm.com/docs/git-status#_porcelain_format_version_2>.

use crate::error::ParseError;
use crate::models::{BranchAheadBehind, StatusEntry, StatusResult};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// One record of porcelain v2 status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusItem {
    /// `# branch.oid`, `None` for the `(initial)` commit of an unborn branch.
    BranchCommit { commit_hash: Option<String> },
    /// `# branch.head`, `None` when `HEAD` is detached.
    BranchHead { branch_name: Option<String> },
    /// `# branch.upstream`
    BranchUpstream { branch_name: String },
    /// `# branch.ab`
    BranchAheadBehind { ahead: u32, behind: u32 },
    /// Any header this parser does not know about.
    UnknownHeader { value: String },
    Entry(StatusEntry),
}

const INITIAL_COMMIT: &str = "(initial)";
const DETACHED_HEAD: &str = "(detached)";

static BRANCH_COMMIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^branch\.oid (.*)$").expect("Invalid static branch.oid regex"));
static BRANCH_HEAD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^branch\.head (.*)$").expect("Invalid static branch.head regex"));
static BRANCH_UPSTREAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^branch\.upstream (.*)$").expect("Invalid static branch.upstream regex")
});
static BRANCH_AHEAD_BEHIND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^branch\.ab \+(\d+) -(\d+)$").expect("Invalid static branch.ab regex")
});

// 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
static CHANGED_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^1 ([MTADRCU?!.]{2}) (N\.\.\.|S[C.][M.][U.]) ([0-7]+) ([0-7]+) ([0-7]+) ([a-f0-9]+) ([a-f0-9]+) (.*)$",
    )
    .expect("Invalid static changed entry regex")
});

// 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path>
static RENAMED_OR_COPIED_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^2 ([MTADRCU?!.]{2}) (N\.\.\.|S[C.][M.][U.]) ([0-7]+) ([0-7]+) ([0-7]+) ([a-f0-9]+) ([a-f0-9]+) ([RC][0-9]+) (.*)$",
    )
    .expect("Invalid static renamed entry regex")
});

// u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
static UNMERGED_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^u ([DAU]{2}) (N\.\.\.|S[C.][M.][U.]) ([0-7]+) ([0-7]+) ([0-7]+) ([0-7]+) ([a-f0-9]+) ([a-f0-9]+) ([a-f0-9]+) (.*)$",
    )
    .expect("Invalid static unmerged entry regex")
});

/// Parses porcelain v2 status output into its records, in input order.
///
/// # Errors
/// Returns a `ParseError` naming the offending record if any positional record
/// does not match the layout for its kind, if a rename/copy record is not
/// followed by its original path, or if both counts of a `branch.ab` header
/// are unparsable.
pub fn parse_porcelain_status(output: &str) -> Result<Vec<StatusItem>, ParseError> {
    let mut items = Vec::new();
    let mut fields = output.split('\0');

    while let Some(field) = fields.next() {
        if field.is_empty() {
            // The remnant after the final terminator.
            continue;
        }

        if let Some(header) = field.strip_prefix("# ").filter(|h| !h.is_empty()) {
            items.push(parse_header(header)?);
            continue;
        }

        match field.as_bytes()[0] {
            b'1' => items.push(parse_changed_entry(field)?),
            b'2' => {
                let old_path = fields.next().filter(|p| !p.is_empty());
                items.push(parse_renamed_or_copied_entry(field, old_path)?);
            }
            b'u' => items.push(parse_unmerged_entry(field)?),
            b'?' => items.push(parse_untracked_entry(field)),
            b'!' => {}
            _ => trace!(record = field, "skipping unrecognised status record"),
        }
    }

    Ok(items)
}

fn parse_header(header: &str) -> Result<StatusItem, ParseError> {
    if let Some(caps) = BRANCH_COMMIT_REGEX.captures(header) {
        let hash = &caps[1];
        return Ok(StatusItem::BranchCommit {
            commit_hash: (hash != INITIAL_COMMIT).then(|| hash.to_string()),
        });
    }

    if let Some(caps) = BRANCH_HEAD_REGEX.captures(header) {
        let name = &caps[1];
        return Ok(StatusItem::BranchHead {
            branch_name: (name != DETACHED_HEAD).then(|| name.to_string()),
        });
    }

    if let Some(caps) = BRANCH_UPSTREAM_REGEX.captures(header) {
        return Ok(StatusItem::BranchUpstream {
            branch_name: caps[1].to_string(),
        });
    }

    if let Some(caps) = BRANCH_AHEAD_BEHIND_REGEX.captures(header) {
        let ahead = caps[1].parse::<u32>().ok();
        let behind = caps[2].parse::<u32>().ok();
        // Only a header where neither count parses is rejected; a single bad
        // count reads as zero.
        if ahead.is_none() && behind.is_none() {
            return Err(ParseError::StatusHeader(header.to_string()));
        }
        return Ok(StatusItem::BranchAheadBehind {
            ahead: ahead.unwrap_or(0),
            behind: behind.unwrap_or(0),
        });
    }

    Ok(StatusItem::UnknownHeader {
        value: header.to_string(),
    })
}

fn parse_changed_entry(field: &str) -> Result<StatusItem, ParseError> {
    let caps = CHANGED_ENTRY_REGEX
        .captures(field)
        .ok_or_else(|| ParseError::ChangedEntry(field.to_string()))?;

    Ok(StatusItem::Entry(StatusEntry {
        path: caps[8].to_string(),
        status_code: caps[1].to_string(),
        old_path: None,
    }))
}

fn parse_renamed_or_copied_entry(
    field: &str,
    old_path: Option<&str>,
) -> Result<StatusItem, ParseError> {
    let caps = RENAMED_OR_COPIED_ENTRY_REGEX
        .captures(field)
        .ok_or_else(|| ParseError::RenamedOrCopiedEntry(field.to_string()))?;
    let old_path = old_path.ok_or_else(|| ParseError::MissingOldPath(field.to_string()))?;

    Ok(StatusItem::Entry(StatusEntry {
        path: caps[9].to_string(),
        status_code: caps[1].to_string(),
        old_path: Some(old_path.to_string()),
    }))
}

fn parse_unmerged_entry(field: &str) -> Result<StatusItem, ParseError> {
    let caps = UNMERGED_ENTRY_REGEX
        .captures(field)
        .ok_or_else(|| ParseError::UnmergedEntry(field.to_string()))?;

    Ok(StatusItem::Entry(StatusEntry {
        path: caps[10].to_string(),
        status_code: caps[1].to_string(),
        old_path: None,
    }))
}

fn parse_untracked_entry(field: &str) -> StatusItem {
    // Untracked records carry a single `?`, but the two character code keeps
    // them in line with every other entry.
    StatusItem::Entry(StatusEntry {
        path: field.get(2..).unwrap_or_default().to_string(),
        status_code: "??".to_string(),
        old_path: None,
    })
}

impl FromIterator<StatusItem> for StatusResult {
    /// Folds parsed records into a `StatusResult`; later headers win and
    /// unknown headers are ignored.
    fn from_iter<I: IntoIterator<Item = StatusItem>>(items: I) -> Self {
        let mut result = StatusResult::default();
        for item in items {
            match item {
                StatusItem::BranchCommit { commit_hash } => result.branch_commit_id = commit_hash,
                StatusItem::BranchHead { branch_name } => result.branch_name = branch_name,
                StatusItem::BranchUpstream { branch_name } => {
                    result.upstream_branch_name = Some(branch_name)
                }
                StatusItem::BranchAheadBehind { ahead, behind } => {
                    result.branch_ahead_behind = Some(BranchAheadBehind { ahead, behind })
                }
                StatusItem::UnknownHeader { .. } => {}
                StatusItem::Entry(entry) => result.entries.push(entry),
            }
        }
        result
    }
}

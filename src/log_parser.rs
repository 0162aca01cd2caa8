//! Parses the output of `git log -z` with a private field delimiter, and the
//! author identity lines it contains.

use crate::error::ParseError;
use crate::models::{Commit, CommitIdentity};
use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Separates the fields of one log record (ASCII unit separator).
pub const FIELD_DELIMITER: char = '\u{1f}';

/// The `--pretty` format matching [`parse_log`]: SHA, summary, body, author
/// identity (with `--date=raw`) and the space separated parent SHAs.
pub const LOG_FORMAT: &str = "%H%x1F%s%x1F%b%x1F%an <%ae> %ad%x1F%P";

const FIELDS_PER_RECORD: usize = 5;

// Same layout as GIT_AUTHOR_IDENT: `NAME <EMAIL> SECONDS +HHMM`. Git strips `<`
// and `>` from names and emails, so the lazy captures stop at the right place.
static IDENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?) <(.*?)> ([0-9]+) ([+-])?([0-9]{2})([0-9]{2})")
        .expect("Invalid static identity regex")
});

/// Parses log output produced with [`LOG_FORMAT`] into commits, in the order
/// git emitted them.
///
/// # Errors
/// Returns `ParseError::LogRecord` for a record with too few fields and
/// `ParseError::Identity` for an author identity that cannot be parsed.
pub fn parse_log(output: &str) -> Result<Vec<Commit>, ParseError> {
    let mut records: Vec<&str> = output.split('\0').collect();
    // Remove the remnant after the final terminator.
    records.pop();

    records.into_iter().map(parse_record).collect()
}

fn parse_record(record: &str) -> Result<Commit, ParseError> {
    let pieces: Vec<&str> = record.splitn(FIELDS_PER_RECORD, FIELD_DELIMITER).collect();
    let [sha, summary, body, identity, parents] = pieces[..] else {
        return Err(ParseError::LogRecord {
            record: record.to_string(),
            found: pieces.len(),
            expected: FIELDS_PER_RECORD,
        });
    };

    let parent_shas = if parents.is_empty() {
        Vec::new()
    } else {
        parents.split(' ').map(str::to_string).collect()
    };

    Ok(Commit {
        sha: sha.to_string(),
        summary: summary.to_string(),
        body: body.trim_end_matches(['\r', '\n']).to_string(),
        author: parse_identity(identity)?,
        parent_shas,
    })
}

/// Parses a git identity string such as
/// `Markus Olsson <j.markus.olsson@gmail.com> 1475670580 +0200`.
///
/// The date must be in git's raw format. A missing sign on the timezone
/// offset is read as positive.
pub fn parse_identity(identity: &str) -> Result<CommitIdentity, ParseError> {
    let invalid = || ParseError::Identity(identity.to_string());
    let caps = IDENTITY_REGEX.captures(identity).ok_or_else(invalid)?;

    let seconds: i64 = caps[3].parse().map_err(|_| invalid())?;
    let date = Utc.timestamp_opt(seconds, 0).single().ok_or_else(invalid)?;

    let hours: i32 = caps[5].parse().map_err(|_| invalid())?;
    let minutes: i32 = caps[6].parse().map_err(|_| invalid())?;
    let sign = match caps.get(4).map(|m| m.as_str()) {
        Some("-") => -1,
        _ => 1,
    };

    Ok(CommitIdentity {
        name: caps[1].to_string(),
        email: caps[2].to_string(),
        date,
        tz_offset_minutes: sign * (hours * 60 + minutes),
    })
}

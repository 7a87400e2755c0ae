//! Commit metadata extracted from a repository.

use chrono::{DateTime, TimeZone, Utc};
use git2::Signature;

/// Author or committer identity attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// UTC offset formatted as `+HHMM` / `-HHMM`.
    pub timezone: String,
    pub when: DateTime<Utc>,
}

impl Identity {
    pub(crate) fn from_signature(sig: &Signature<'_>) -> Self {
        let time = sig.when();
        Self {
            name: sig.name().unwrap_or_default().to_string(),
            email: sig.email().unwrap_or_default().to_string(),
            timezone: format_offset(time.offset_minutes()),
            when: timestamp(time.seconds()),
        }
    }
}

/// Everything the index needs to know about one commit: identities,
/// messages, timestamp and diff statistics against the first parent.
#[derive(Debug, Clone)]
pub struct CommitDetails {
    pub sha: String,
    pub author: Identity,
    pub committer: Identity,
    pub short_message: String,
    pub full_message: String,
    pub commit_time: DateTime<Utc>,
    pub lines_added: usize,
    pub lines_removed: usize,
}

pub(crate) fn timestamp(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let minutes = offset_minutes.abs();
    format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
}

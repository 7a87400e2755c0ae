//! Document types stored in the search index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author or committer identity as stored on a commit document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdent {
    pub name: String,
    pub email: String,
    /// UTC offset formatted as `+HHMM` / `-HHMM`.
    pub time_zone: String,
    pub when: DateTime<Utc>,
}

/// One commit published to the index.
///
/// The document id is the commit SHA, so re-publishing the same commit
/// overwrites the existing document with identical content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDoc {
    pub namespace: String,
    pub repo: String,
    pub branch: String,
    pub repo_url: String,
    pub sha: String,
    pub author: PersonIdent,
    pub committer: PersonIdent,
    pub short_message: String,
    pub full_message: String,
    pub commit_time: DateTime<Utc>,
    pub lines_added: u64,
    pub lines_removed: u64,
    /// Mirror of `commit_time` under the conventional time-series
    /// field name so dashboards pick it up without extra configuration.
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ident(seconds: i64) -> PersonIdent {
        PersonIdent {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            time_zone: "+0000".into(),
            when: Utc.timestamp_opt(seconds, 0).unwrap(),
        }
    }

    #[test]
    fn test_commit_doc_serializes_timestamp_alias() {
        let when = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let doc = CommitDoc {
            namespace: "default".into(),
            repo: "myapp".into(),
            branch: "master".into(),
            repo_url: "https://example.com/myapp.git".into(),
            sha: "abc123".into(),
            author: ident(1_700_000_000),
            committer: ident(1_700_000_000),
            short_message: "fix".into(),
            full_message: "fix\n\ndetails".into(),
            commit_time: when,
            lines_added: 3,
            lines_removed: 1,
            timestamp: when,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["sha"], "abc123");
        assert_eq!(json["@timestamp"], json["commit_time"]);
        assert_eq!(json["author"]["email"], "alice@example.com");
        assert_eq!(json["lines_added"], 3);
    }
}

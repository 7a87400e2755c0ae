//! Commit reconciliation.
//!
//! Given the full branch history (newest first) and the newest/oldest
//! commit SHAs already present in the index, work out which commits
//! still need publishing and in what order. New commits are published
//! oldest-first and older history is appended in walk order, so the
//! published range stays contiguous and gap-free even when a run is
//! interrupted partway. Once a repository has caught up, steady-state
//! runs select nothing.

/// Select the commits to publish from a newest-first history walk.
///
/// `newest_indexed` / `oldest_indexed` are the boundary SHAs currently
/// in the index for this scope. When either is missing the index holds
/// no usable range for the scope and the whole walk is published as-is.
/// When both resolve, the walk is partitioned around them:
///
/// - commits seen before the newest boundary are new; they are
///   reversed so the commit closest to the existing range goes first
/// - commits between the boundaries are already indexed and skipped
/// - commits seen after the oldest boundary extend the range backward
///   and keep their walk order
///
/// The boundary commits themselves are sentinels and never re-selected.
/// A non-zero `commit_limit` caps the result so large backlogs drain
/// across multiple scheduler ticks.
#[must_use]
pub fn select_commits(
    shas_newest_first: &[String],
    newest_indexed: Option<&str>,
    oldest_indexed: Option<&str>,
    commit_limit: u32,
) -> Vec<String> {
    if shas_newest_first.is_empty() {
        return Vec::new();
    }

    let (Some(newest), Some(oldest)) = (newest_indexed, oldest_indexed) else {
        return truncate(shas_newest_first.to_vec(), commit_limit);
    };

    let mut new_commits = Vec::new();
    let mut old_commits = Vec::new();
    let mut seen_newest = false;
    let mut seen_oldest = false;

    for sha in shas_newest_first {
        if sha == newest {
            seen_newest = true;
            // A scope with a single indexed commit reports the same
            // SHA as both boundaries; it closes the range too.
            if newest == oldest {
                seen_oldest = true;
            }
        } else if sha == oldest {
            seen_oldest = true;
        } else if !seen_newest {
            new_commits.push(sha.clone());
        } else if seen_oldest {
            old_commits.push(sha.clone());
        }
        // remaining case: inside the already-indexed range, skip
    }

    new_commits.reverse();
    new_commits.extend(old_commits);
    truncate(new_commits, commit_limit)
}

fn truncate(mut commits: Vec<String>, limit: u32) -> Vec<String> {
    if limit > 0 {
        commits.truncate(limit as usize);
    }
    commits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shas(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_history_selects_nothing() {
        assert!(select_commits(&[], Some("d"), Some("a"), 0).is_empty());
        assert!(select_commits(&[], None, None, 0).is_empty());
    }

    #[test]
    fn test_first_run_publishes_everything() {
        let history = shas(&["d", "c", "b", "a"]);
        assert_eq!(select_commits(&history, None, None, 0), history);
    }

    #[test]
    fn test_single_boundary_falls_back_to_full_list() {
        // Both boundaries come from the same scope, so only one
        // resolving is anomalous; republishing is the safe answer.
        let history = shas(&["d", "c", "b", "a"]);
        assert_eq!(select_commits(&history, Some("d"), None, 0), history);
        assert_eq!(select_commits(&history, None, Some("a"), 0), history);
    }

    #[test]
    fn test_fully_indexed_selects_nothing() {
        // History [a(oldest) .. d(newest)], range a..d already covered.
        let history = shas(&["d", "c", "b", "a"]);
        assert!(select_commits(&history, Some("d"), Some("a"), 0).is_empty());
    }

    #[test]
    fn test_new_head_commit_detected() {
        // Appending e at HEAD over a fully indexed a..d range.
        let history = shas(&["e", "d", "c", "b", "a"]);
        assert_eq!(
            select_commits(&history, Some("d"), Some("a"), 0),
            shas(&["e"])
        );
    }

    #[test]
    fn test_older_ancestor_discovered() {
        // A deeper walk reveals z below the oldest boundary a.
        let history = shas(&["e", "d", "c", "b", "a", "z"]);
        assert_eq!(
            select_commits(&history, Some("e"), Some("a"), 0),
            shas(&["z"])
        );
    }

    #[test]
    fn test_new_bucket_oldest_first_then_old_bucket_in_walk_order() {
        // Indexed range c..e inside walk [g f e d c b a]:
        // f and g are new (f is closer to the range, so published
        // first), b and a extend the range backward in walk order.
        let history = shas(&["g", "f", "e", "d", "c", "b", "a"]);
        assert_eq!(
            select_commits(&history, Some("e"), Some("c"), 0),
            shas(&["f", "g", "b", "a"])
        );
    }

    #[test]
    fn test_boundaries_are_sentinels() {
        let history = shas(&["c", "b", "a"]);
        let selected = select_commits(&history, Some("c"), Some("a"), 0);
        assert!(!selected.contains(&"c".to_string()));
        assert!(!selected.contains(&"a".to_string()));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_equal_boundaries_keep_draining() {
        // One indexed commit means both boundaries resolve to the same
        // SHA; older history must still come out.
        let history = shas(&["c", "b", "a"]);
        assert_eq!(
            select_commits(&history, Some("c"), Some("c"), 1),
            shas(&["b"])
        );
        assert_eq!(
            select_commits(&history, Some("c"), Some("c"), 0),
            shas(&["b", "a"])
        );

        // New commits above an equal boundary drain as well.
        let history = shas(&["d", "c", "b"]);
        assert_eq!(
            select_commits(&history, Some("c"), Some("c"), 0),
            shas(&["d", "b"])
        );
    }

    #[test]
    fn test_commit_limit_truncates_preserving_order() {
        let history = shas(&["g", "f", "e", "d", "c", "b", "a"]);
        assert_eq!(
            select_commits(&history, Some("e"), Some("c"), 3),
            shas(&["f", "g", "b"])
        );
        // Zero means unlimited.
        assert_eq!(
            select_commits(&history, Some("e"), Some("c"), 0).len(),
            4
        );
    }

    #[test]
    fn test_backlog_drains_without_duplicates_or_gaps() {
        // Simulate repeated runs against an index that reports the
        // published range's edges. 7 commits with limit L drain in
        // ceil(7/L) runs with no duplicates; limit 1 exercises the
        // equal-boundaries state after the first run.
        let history = shas(&["g", "f", "e", "d", "c", "b", "a"]);

        for limit in 1..=3u32 {
            let expected_runs = history.len().div_ceil(limit as usize);

            // Indices into `history` of published commits; the newest
            // boundary is the smallest index, the oldest the largest.
            let mut published: Vec<usize> = Vec::new();
            let mut runs = 0;

            loop {
                let newest = published.iter().min().map(|&i| history[i].as_str());
                let oldest = published.iter().max().map(|&i| history[i].as_str());
                let selected = select_commits(&history, newest, oldest, limit);
                if selected.is_empty() {
                    break;
                }
                runs += 1;
                assert!(runs <= expected_runs, "limit {limit}: drain did not terminate");
                for sha in &selected {
                    let idx = history.iter().position(|h| h == sha).unwrap_or(usize::MAX);
                    assert!(!published.contains(&idx), "duplicate publish of {sha}");
                    published.push(idx);
                }
            }

            assert_eq!(runs, expected_runs, "limit {limit}");
            assert_eq!(published.len(), history.len(), "limit {limit}");

            // Contiguity: published indices form a solid prefix range
            // of the walk once draining completes.
            published.sort_unstable();
            assert_eq!(published, (0..history.len()).collect::<Vec<_>>());
        }
    }
}

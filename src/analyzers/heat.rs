use std::collections::{HashMap, HashSet};

use crate::classify;
use crate::types::{CommitRecord, FileHeatEntry};

// Fixed design parameters: 30-day exponential recency decay, blended
// 0.4 commits / 0.6 recency.
const DECAY_DAYS: f64 = 30.0;
const COMMIT_WEIGHT: f64 = 0.4;
const RECENCY_WEIGHT: f64 = 0.6;

/// Ranks the files still present in the working tree by activity heat:
/// how often and how recently they changed. Files deleted before the
/// current snapshot are excluded — the heat map shows present-day
/// relevance, not the churn of since-removed files.
///
/// `now` is the reference timestamp recency decays from; callers pass
/// `chrono::Utc::now().timestamp()`.
pub fn rank_heat(
    commits: &[CommitRecord],
    current_files: &HashSet<String>,
    now: i64,
) -> Vec<FileHeatEntry> {
    struct Accum {
        commit_count: usize,
        last_modified: i64,
        net_lines: i64,
    }

    let mut per_file: HashMap<&str, Accum> = HashMap::new();

    for commit in commits {
        for change in &commit.changes {
            if !current_files.contains(change.path.as_str()) {
                continue;
            }
            let entry = per_file.entry(change.path.as_str()).or_insert(Accum {
                commit_count: 0,
                last_modified: commit.timestamp,
                net_lines: 0,
            });
            entry.commit_count += 1;
            entry.last_modified = entry.last_modified.max(commit.timestamp);
            entry.net_lines += change.lines_added as i64 - change.lines_deleted as i64;
        }
    }

    let mut entries: Vec<FileHeatEntry> = per_file
        .into_iter()
        .map(|(path, accum)| {
            let days_ago = ((now - accum.last_modified) / 86_400).max(0) as f64;
            let recency = (-days_ago / DECAY_DAYS).exp();
            FileHeatEntry {
                path: path.to_string(),
                heat_score: accum.commit_count as f64 * COMMIT_WEIGHT + recency * RECENCY_WEIGHT,
                commit_count: accum.commit_count,
                last_modified: accum.last_modified,
                total_lines: accum.net_lines.max(1) as u64,
                language: classify::detect_language(path).name.to_string(),
                category: classify::classify_category(path),
            }
        })
        .collect();

    // Heat desc, then commit count desc, then path asc — an explicit
    // tie-break rather than whatever the sort happens to preserve.
    entries.sort_by(|a, b| {
        b.heat_score
            .partial_cmp(&a.heat_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.commit_count.cmp(&a.commit_count))
            .then_with(|| a.path.cmp(&b.path))
    });

    entries
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeStatus, FileChange};

    const DAY: i64 = 86_400;
    const NOW: i64 = 1_700_000_000;

    fn make_commit(sha: &str, timestamp: i64, files: &[(&str, u64, u64)]) -> CommitRecord {
        CommitRecord {
            sha: sha.to_string(),
            author_name: "dev".to_string(),
            author_email: "dev@example.com".to_string(),
            timestamp,
            subject: "change".to_string(),
            changes: files
                .iter()
                .map(|(path, added, deleted)| FileChange {
                    path: path.to_string(),
                    lines_added: *added,
                    lines_deleted: *deleted,
                    bytes_added: None,
                    bytes_deleted: None,
                    status: ChangeStatus::Modified,
                })
                .collect(),
        }
    }

    fn files(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_deleted_files_are_excluded() {
        let commits = vec![
            make_commit("aaa", NOW - 10 * DAY, &[("src/kept.rs", 5, 0), ("src/gone.rs", 50, 0)]),
            make_commit("bbb", NOW - 5 * DAY, &[("src/gone.rs", 10, 0)]),
        ];
        let current = files(&["src/kept.rs"]);
        let heat = rank_heat(&commits, &current, NOW);
        assert_eq!(heat.len(), 1, "only surviving files appear in the heat map");
        assert_eq!(heat[0].path, "src/kept.rs");
    }

    #[test]
    fn test_heat_decreases_with_staleness() {
        // Same commit count, different recency
        let commits = vec![
            make_commit("aaa", NOW - 2 * DAY, &[("fresh.rs", 1, 0)]),
            make_commit("bbb", NOW - 90 * DAY, &[("stale.rs", 1, 0)]),
        ];
        let current = files(&["fresh.rs", "stale.rs"]);
        let heat = rank_heat(&commits, &current, NOW);
        let fresh = heat.iter().find(|e| e.path == "fresh.rs").unwrap();
        let stale = heat.iter().find(|e| e.path == "stale.rs").unwrap();
        assert!(
            fresh.heat_score > stale.heat_score,
            "equal commit counts: the fresher file must be hotter"
        );
    }

    #[test]
    fn test_heat_increases_with_commit_count() {
        // Same last-modified timestamp, different frequency
        let commits = vec![
            make_commit("aaa", NOW - 20 * DAY, &[("busy.rs", 1, 0)]),
            make_commit("bbb", NOW - 10 * DAY, &[("busy.rs", 1, 0), ("quiet.rs", 1, 0)]),
        ];
        let current = files(&["busy.rs", "quiet.rs"]);
        let heat = rank_heat(&commits, &current, NOW);
        let busy = heat.iter().find(|e| e.path == "busy.rs").unwrap();
        let quiet = heat.iter().find(|e| e.path == "quiet.rs").unwrap();
        assert!(
            busy.heat_score > quiet.heat_score,
            "equal recency: the more-touched file must be hotter"
        );
    }

    #[test]
    fn test_total_lines_floored_at_one() {
        let commits = vec![make_commit("aaa", NOW, &[("shrunk.rs", 2, 30)])];
        let current = files(&["shrunk.rs"]);
        let heat = rank_heat(&commits, &current, NOW);
        assert_eq!(heat[0].total_lines, 1, "net-negative files stay visible at 1 line");
    }

    #[test]
    fn test_tie_break_is_path_ascending() {
        // Identical profiles → identical heat; path decides the order
        let commits = vec![make_commit("aaa", NOW - DAY, &[("b.rs", 1, 0), ("a.rs", 1, 0)])];
        let current = files(&["a.rs", "b.rs"]);
        let heat = rank_heat(&commits, &current, NOW);
        assert_eq!(heat[0].path, "a.rs");
        assert_eq!(heat[1].path, "b.rs");
    }

    #[test]
    fn test_last_modified_is_latest_touch() {
        let commits = vec![
            make_commit("aaa", NOW - 30 * DAY, &[("a.rs", 1, 0)]),
            make_commit("bbb", NOW - 3 * DAY, &[("a.rs", 1, 0)]),
        ];
        let current = files(&["a.rs"]);
        let heat = rank_heat(&commits, &current, NOW);
        assert_eq!(heat[0].last_modified, NOW - 3 * DAY);
        assert_eq!(heat[0].commit_count, 2);
    }
}

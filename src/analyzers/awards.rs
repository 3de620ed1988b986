use std::collections::HashMap;

use crate::types::{
    Awards, CommitAward, CommitRecord, ContributorStat, FileAnalysisResult, TopFileStat, TopFiles,
};

pub const DEFAULT_TOP_N: usize = 5;

// ─── Top files ────────────────────────────────────────────────────────────────

/// Ranks files three ways: by cumulative size (net lines over the whole
/// history), by churn (number of changes), and by measured complexity.
/// When complexity analysis was skipped or unavailable the complexity list
/// degrades to empty rather than failing.
pub fn top_files(
    commits: &[CommitRecord],
    complexity: Option<&[FileAnalysisResult]>,
    top_n: usize,
) -> TopFiles {
    let mut net_lines: HashMap<&str, i64> = HashMap::new();
    let mut change_counts: HashMap<&str, u64> = HashMap::new();

    for commit in commits {
        for change in &commit.changes {
            *net_lines.entry(change.path.as_str()).or_default() +=
                change.lines_added as i64 - change.lines_deleted as i64;
            *change_counts.entry(change.path.as_str()).or_default() += 1;
        }
    }

    let by_size = rank(
        net_lines
            .into_iter()
            .filter(|(_, net)| *net > 0)
            .map(|(path, net)| (path.to_string(), net as u64)),
        top_n,
    );
    let by_churn = rank(
        change_counts
            .into_iter()
            .map(|(path, count)| (path.to_string(), count)),
        top_n,
    );
    let by_complexity = match complexity {
        Some(results) => rank(
            results
                .iter()
                .filter(|r| r.complexity > 0)
                .map(|r| (r.path.clone(), r.complexity as u64)),
            top_n,
        ),
        None => Vec::new(),
    };

    TopFiles { by_size, by_churn, by_complexity }
}

fn rank(values: impl Iterator<Item = (String, u64)>, top_n: usize) -> Vec<TopFileStat> {
    let mut stats: Vec<TopFileStat> = values
        .map(|(path, value)| TopFileStat { path, value })
        .collect();
    stats.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.path.cmp(&b.path)));
    stats.truncate(top_n);
    stats
}

// ─── Commit & contributor awards ──────────────────────────────────────────────

pub fn calculate_awards(commits: &[CommitRecord], top_n: usize) -> Awards {
    let most_files_touched = top_commits_by(commits, top_n, |c| c.changes.len() as u64);
    let most_lines_added = top_commits_by(commits, top_n, |c| {
        c.changes.iter().map(|f| f.lines_added).sum()
    });
    let most_lines_removed = top_commits_by(commits, top_n, |c| {
        c.changes.iter().map(|f| f.lines_deleted).sum()
    });
    let most_bytes_added = top_commits_by(commits, top_n, |c| {
        c.changes.iter().filter_map(|f| f.bytes_added).sum()
    });
    let most_bytes_removed = top_commits_by(commits, top_n, |c| {
        c.changes.iter().filter_map(|f| f.bytes_deleted).sum()
    });

    let contributors = contributor_stats(commits);

    let mut top_contributors = contributors.clone();
    top_contributors.sort_by(|a, b| {
        b.commit_count
            .cmp(&a.commit_count)
            .then_with(|| a.author.cmp(&b.author))
    });
    top_contributors.truncate(top_n);

    // No minimum-commit threshold: a single-commit contributor can hold
    // either extreme. The commit count rides along for consumers that
    // want to filter.
    let lowest_avg_lines_changed = contributors
        .iter()
        .min_by(|a, b| order_by_avg(a, b))
        .cloned();
    let highest_avg_lines_changed = contributors
        .iter()
        .max_by(|a, b| order_by_avg(a, b))
        .cloned();

    Awards {
        top_contributors,
        most_files_touched,
        most_lines_added,
        most_lines_removed,
        most_bytes_added,
        most_bytes_removed,
        lowest_avg_lines_changed,
        highest_avg_lines_changed,
    }
}

fn order_by_avg(a: &ContributorStat, b: &ContributorStat) -> std::cmp::Ordering {
    a.avg_lines_changed
        .partial_cmp(&b.avg_lines_changed)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| b.author.cmp(&a.author))
}

fn top_commits_by(
    commits: &[CommitRecord],
    top_n: usize,
    metric: impl Fn(&CommitRecord) -> u64,
) -> Vec<CommitAward> {
    let mut awards: Vec<CommitAward> = commits
        .iter()
        .map(|c| CommitAward {
            sha: c.sha.clone(),
            author: c.author_name.clone(),
            subject: c.subject.clone(),
            value: metric(c),
        })
        .filter(|a| a.value > 0)
        .collect();
    awards.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.sha.cmp(&b.sha)));
    awards.truncate(top_n);
    awards
}

fn contributor_stats(commits: &[CommitRecord]) -> Vec<ContributorStat> {
    struct Accum {
        name: String,
        commit_count: usize,
        lines_added: u64,
        lines_deleted: u64,
    }

    // Keyed by email; the display name is whichever spelling showed up first
    let mut per_author: HashMap<&str, Accum> = HashMap::new();
    for commit in commits {
        let entry = per_author
            .entry(commit.author_email.as_str())
            .or_insert_with(|| Accum {
                name: commit.author_name.clone(),
                commit_count: 0,
                lines_added: 0,
                lines_deleted: 0,
            });
        entry.commit_count += 1;
        entry.lines_added += commit.changes.iter().map(|f| f.lines_added).sum::<u64>();
        entry.lines_deleted += commit.changes.iter().map(|f| f.lines_deleted).sum::<u64>();
    }

    per_author
        .into_values()
        .map(|a| ContributorStat {
            avg_lines_changed: (a.lines_added + a.lines_deleted) as f64 / a.commit_count as f64,
            author: a.name,
            commit_count: a.commit_count,
            lines_added: a.lines_added,
            lines_deleted: a.lines_deleted,
        })
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

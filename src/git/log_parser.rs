use crate::types::{ChangeStatus, CommitRecord, FileChange};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Runs a single `git log --numstat --raw` and returns structured
/// CommitRecords in chronological (ascending) order.
///
/// One subprocess produces everything the engine needs: commit metadata,
/// per-file line deltas (numstat block) and per-file change status
/// (raw block). Running separate `git log` passes per concern would
/// multiply the git overhead on large histories.
pub fn parse_log(
    cwd: &Path,
    since: &str,
    max_commits: Option<usize>,
) -> Result<Vec<CommitRecord>, String> {
    let mut args: Vec<String> = vec![
        "log".into(),
        "--format=COMMIT|%H|%an|%ae|%ad|%s".into(),
        "--date=unix".into(),
        "--reverse".into(),
        "--numstat".into(),
        "--raw".into(),
        "--diff-filter=ACDMRT".into(),
    ];

    if !since.is_empty() {
        args.push(format!("--since={since}"));
    }
    if let Some(n) = max_commits {
        args.push("-n".into());
        args.push(n.to_string());
    }

    let mut child = Command::new("git")
        .args(&args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to run git: {e}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "Failed to capture git stdout".to_string())?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| "Failed to capture git stderr".to_string())?;

    let stderr_reader = thread::spawn(move || {
        let mut stderr_text = String::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_string(&mut stderr_text);
        stderr_text
    });

    let mut commits: Vec<CommitRecord> = Vec::new();
    let mut current: Option<PendingCommit> = None;

    for line in BufReader::new(stdout).lines() {
        let line = line.map_err(|e| format!("Failed reading git output: {e}"))?;
        parse_commit_line(&line, &mut commits, &mut current);
    }

    if let Some(pending) = current.take() {
        commits.push(pending.finish());
    }

    let status = child
        .wait()
        .map_err(|e| format!("Failed to wait for git process: {e}"))?;

    if !status.success() {
        let stderr_text = stderr_reader.join().unwrap_or_else(|_| String::new());
        return Err(format!("git log failed: {stderr_text}"));
    }

    let _ = stderr_reader.join();

    Ok(commits)
}

/// A commit whose diff blocks are still streaming in. Raw status lines and
/// numstat lines arrive separately and are joined by path on `finish`.
struct PendingCommit {
    record: CommitRecord,
    statuses: HashMap<String, ChangeStatus>,
    stats: Vec<(u64, u64, String)>,
}

impl PendingCommit {
    fn finish(mut self) -> CommitRecord {
        for (added, deleted, path) in self.stats {
            let status = self
                .statuses
                .remove(&path)
                .unwrap_or(ChangeStatus::Modified);
            self.record.changes.push(FileChange {
                path,
                lines_added: added,
                lines_deleted: deleted,
                bytes_added: None,
                bytes_deleted: None,
                status,
            });
        }
        self.record
    }
}

fn parse_commit_line(
    line: &str,
    commits: &mut Vec<CommitRecord>,
    current: &mut Option<PendingCommit>,
) {
    let trimmed = line.trim_end();

    if let Some(rest) = trimmed.strip_prefix("COMMIT|") {
        if let Some(pending) = current.take() {
            commits.push(pending.finish());
        }
        let mut parts = rest.splitn(5, '|');
        if let (Some(sha), Some(name), Some(email), Some(timestamp), Some(subject)) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        {
            *current = Some(PendingCommit {
                record: CommitRecord {
                    sha: sha.to_string(),
                    author_name: name.to_string(),
                    author_email: email.to_string(),
                    timestamp: timestamp.parse().unwrap_or(0),
                    subject: subject.to_string(),
                    changes: Vec::new(),
                },
                statuses: HashMap::new(),
                stats: Vec::new(),
            });
        }
    } else if let Some(raw) = trimmed.strip_prefix(':') {
        // Raw diff line: "100644 100644 abc1234 def5678 M\tpath"
        // (renames/copies carry two path fields; the target is last)
        if let Some((meta, paths)) = raw.split_once('\t') {
            let status_token = meta.split_whitespace().last().unwrap_or("");
            let target = paths.split('\t').next_back().unwrap_or("").trim();
            if let (Some(status), false) = (parse_status(status_token), target.is_empty()) {
                if let Some(ref mut pending) = current {
                    pending.statuses.insert(target.to_string(), status);
                }
            }
        }
    } else if !trimmed.is_empty() {
        // Numstat line: "added\tdeleted\tpath" ("-" for binary files)
        let mut parts = trimmed.splitn(3, '\t');
        if let (Some(added_raw), Some(deleted_raw), Some(raw_name)) =
            (parts.next(), parts.next(), parts.next())
        {
            if let Some(filename) = normalize_filename(raw_name) {
                let added: u64 = if added_raw == "-" { 0 } else { added_raw.parse().unwrap_or(0) };
                let deleted: u64 = if deleted_raw == "-" { 0 } else { deleted_raw.parse().unwrap_or(0) };
                if let Some(ref mut pending) = current {
                    pending.stats.push((added, deleted, filename));
                }
            }
        }
    }
}

fn parse_status(token: &str) -> Option<ChangeStatus> {
    match token.chars().next()? {
        'A' => Some(ChangeStatus::Added),
        'D' => Some(ChangeStatus::Deleted),
        'R' => Some(ChangeStatus::Renamed),
        'M' | 'C' | 'T' => Some(ChangeStatus::Modified),
        _ => None,
    }
}

/// Normalizes git rename notations:
///   "src/{old => new}/file.js" → "src/new/file.js"
///   "old-name => new-name"     → "new-name"
fn normalize_filename(raw: &str) -> Option<String> {
    if raw.contains('{') && raw.contains("=>") {
        let re = once_cell::sync::Lazy::force(&RENAME_RE);
        let result = re.replace(raw, "$1").replace("//", "/");
        return if result.contains('{') {
            None
        } else {
            Some(result.trim().to_string())
        };
    }
    if raw.contains(" => ") {
        return raw.split(" => ").last().map(|s| s.trim().to_string());
    }
    let t = raw.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

static RENAME_RE: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| regex::Regex::new(r"\{[^}]+ => ([^}]+)\}").unwrap());

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(lines: &[&str]) -> Vec<CommitRecord> {
        let mut commits = Vec::new();
        let mut current = None;
        for line in lines {
            parse_commit_line(line, &mut commits, &mut current);
        }
        if let Some(pending) = current.take() {
            commits.push(pending.finish());
        }
        commits
    }

    #[test]
    fn test_parses_commit_header() {
        let commits = feed(&["COMMIT|abc123|Ada|ada@example.com|1700000000|initial commit"]);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sha, "abc123");
        assert_eq!(commits[0].author_name, "Ada");
        assert_eq!(commits[0].author_email, "ada@example.com");
        assert_eq!(commits[0].timestamp, 1_700_000_000);
        assert_eq!(commits[0].subject, "initial commit");
    }

    #[test]
    fn test_subject_with_pipes_is_kept_whole() {
        let commits = feed(&["COMMIT|abc|Ada|a@b.c|0|fix: a | b | c"]);
        assert_eq!(commits[0].subject, "fix: a | b | c");
    }

    #[test]
    fn test_joins_numstat_and_raw_status() {
        let commits = feed(&[
            "COMMIT|abc|Ada|a@b.c|1700000000|add feature",
            ":000000 100644 0000000 1111111 A\tsrc/new.rs",
            ":100644 100644 2222222 3333333 M\tsrc/old.rs",
            "10\t0\tsrc/new.rs",
            "3\t2\tsrc/old.rs",
        ]);
        let changes = &commits[0].changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path, "src/new.rs");
        assert_eq!(changes[0].status, ChangeStatus::Added);
        assert_eq!(changes[0].lines_added, 10);
        assert_eq!(changes[1].status, ChangeStatus::Modified);
        assert_eq!(changes[1].lines_deleted, 2);
    }

    #[test]
    fn test_rename_raw_line_targets_new_path() {
        let commits = feed(&[
            "COMMIT|abc|Ada|a@b.c|0|rename",
            ":100644 100644 1111111 1111111 R100\tsrc/old.rs\tsrc/new.rs",
            "0\t0\tsrc/{old.rs => new.rs}",
        ]);
        let changes = &commits[0].changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "src/new.rs", "rename must resolve to the new path");
        assert_eq!(changes[0].status, ChangeStatus::Renamed);
    }

    #[test]
    fn test_binary_numstat_keeps_file_with_zero_lines() {
        let commits = feed(&[
            "COMMIT|abc|Ada|a@b.c|0|add image",
            ":000000 100644 0000000 1111111 A\tassets/logo.png",
            "-\t-\tassets/logo.png",
        ]);
        let changes = &commits[0].changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].lines_added, 0);
        assert_eq!(changes[0].lines_deleted, 0);
        assert_eq!(changes[0].status, ChangeStatus::Added);
    }

    #[test]
    fn test_status_defaults_to_modified_without_raw_line() {
        let commits = feed(&[
            "COMMIT|abc|Ada|a@b.c|0|touch",
            "1\t1\tsrc/lib.rs",
        ]);
        assert_eq!(commits[0].changes[0].status, ChangeStatus::Modified);
    }

    #[test]
    fn test_multiple_commits_split_correctly() {
        let commits = feed(&[
            "COMMIT|aaa|Ada|a@b.c|100|first",
            "5\t0\ta.rs",
            "",
            "COMMIT|bbb|Bob|b@b.c|200|second",
            "2\t1\ta.rs",
        ]);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].changes.len(), 1);
        assert_eq!(commits[1].sha, "bbb");
        assert_eq!(commits[1].changes[0].lines_deleted, 1);
    }

    #[test]
    fn test_normalize_filename_brace_rename() {
        assert_eq!(
            normalize_filename("src/{old => new}/file.js"),
            Some("src/new/file.js".to_string())
        );
        assert_eq!(
            normalize_filename("old-name => new-name"),
            Some("new-name".to_string())
        );
        assert_eq!(normalize_filename("plain/path.rs"), Some("plain/path.rs".to_string()));
        assert_eq!(normalize_filename("   "), None);
    }
}

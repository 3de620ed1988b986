use std::collections::HashSet;
use std::path::Path;
use std::process::Command;

/// Lists the file paths currently present in the working tree via
/// `git ls-files`. The heat ranking only covers these — deleted files stay
/// in history but out of the heat map.
pub fn current_files(repo: &Path) -> Result<HashSet<String>, String> {
    let output = Command::new("git")
        .args(["ls-files"])
        .current_dir(repo)
        .output()
        .map_err(|e| format!("Failed to run git ls-files: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git ls-files failed: {}", stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect())
}

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analyzers::temporal::Granularity;

pub const CONFIG_FILENAME: &str = ".git-chronicle.yml";

/// All settings that can be placed in a .git-chronicle.yml config file.
/// Every field is optional — omitted fields fall back to CLI defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChronicleConfig {
    // Analysis scope
    pub since: Option<String>,
    pub max_commits: Option<usize>,

    // Series shape
    pub granularity: Option<String>,
    pub retain_empty_buckets: Option<bool>,

    // Complexity analysis
    pub batch_size: Option<usize>,
    pub no_complexity: Option<bool>,

    // Rankings & output
    pub top: Option<usize>,
    pub format: Option<String>,
    pub output: Option<String>,
}

impl ChronicleConfig {
    /// Validates semantic constraints that serde cannot enforce.
    ///
    /// Returns a human-readable error describing exactly what is wrong and
    /// what values are accepted. Called automatically by [`load_config`].
    pub fn validate(&self) -> Result<(), String> {
        if let Some(fmt) = &self.format {
            match fmt.as_str() {
                "terminal" | "json" => {}
                other => {
                    return Err(format!(
                        "Invalid 'format' value: \"{other}\". \
                         Expected one of: \"terminal\", \"json\""
                    ))
                }
            }
        }

        if let Some(g) = &self.granularity {
            g.parse::<Granularity>()?;
        }

        // top: 0 would silently produce empty rankings — almost certainly a mistake
        if let Some(0) = self.top {
            return Err("Invalid 'top' value: 0. Must be 1 or greater".to_string());
        }

        if let Some(0) = self.batch_size {
            return Err(
                "Invalid 'batch_size' value: 0. \
                 Must be 1 or greater (it bounds concurrent git invocations)"
                    .to_string(),
            );
        }

        Ok(())
    }
}

/// Reads, parses, and validates a YAML config file from `path`.
pub fn load_config(path: &Path) -> Result<ChronicleConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config file '{}': {e}", path.display()))?;
    let cfg: ChronicleConfig = serde_yaml::from_str(&content)
        .map_err(|e| format!("Invalid config file '{}': {e}", path.display()))?;
    cfg.validate()
        .map_err(|e| format!("Config file '{}': {e}", path.display()))?;
    Ok(cfg)
}

/// Looks for a config file: next to the repo first, then the home directory.
pub fn discover_config(repo: &Path) -> Option<PathBuf> {
    let local = repo.join(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    let home = dirs::home_dir()?.join(CONFIG_FILENAME);
    home.exists().then_some(home)
}

/// Annotated YAML template — printed by `--generate-config`.
pub static TEMPLATE: &str = r#"# git-chronicle configuration file
# Generated by: git-chronicle --generate-config
#
# All settings are optional. Omit any field to use the built-in default.
# CLI flags always take precedence over values in this file.
# Save this file as .git-chronicle.yml in your repository root or home
# directory.

# ── Analysis scope ─────────────────────────────────────────────────────────────

# Analyze commits since this date. Leave empty (or omit) for all history.
# Accepts any git date format: "6 months ago", "2024-01-01", "1 year ago"
# since: ""

# Cap on the number of commits analyzed (most recent first).
# max_commits: 5000

# ── Series shape ───────────────────────────────────────────────────────────────

# Calendar bucket size for the time series: day, week, month
# granularity: "week"

# Keep calendar buckets with zero commits in the time series.
# retain_empty_buckets: false

# ── Complexity analysis ────────────────────────────────────────────────────────

# Files fetched per batch during complexity analysis. Bounds how many
# git processes run at once.
# batch_size: 10

# Skip complexity analysis entirely. Complexity-derived views (hotspots,
# top files by complexity) come out empty.
# no_complexity: false

# ── Rankings & output ──────────────────────────────────────────────────────────

# Entries per ranking (awards, top files).
# top: 5

# Output format: terminal, json
# format: "terminal"

# Output file path (JSON only; omit to print to stdout).
# output: "chronicle-report.json"
"#;

/// Prints the config template to stdout, or writes it to `output_path` if given.
pub fn print_template(output_path: Option<&Path>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(path, TEMPLATE)
            .map_err(|e| format!("Cannot write config template to '{}': {e}", path.display())),
        None => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

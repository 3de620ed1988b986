use serde::Serialize;

// ─── Core Git Data ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: String,
    pub lines_added: u64,
    pub lines_deleted: u64,
    /// Byte deltas are provider-dependent; `git log --numstat` has none.
    pub bytes_added: Option<u64>,
    pub bytes_deleted: Option<u64>,
    pub status: ChangeStatus,
}

#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: i64,
    pub subject: String,
    pub changes: Vec<FileChange>,
}

// ─── Classification ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Application,
    Test,
    Build,
    Documentation,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 5] = [
        FileCategory::Application,
        FileCategory::Test,
        FileCategory::Build,
        FileCategory::Documentation,
        FileCategory::Other,
    ];
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileCategory::Application   => write!(f, "application"),
            FileCategory::Test          => write!(f, "test"),
            FileCategory::Build         => write!(f, "build"),
            FileCategory::Documentation => write!(f, "documentation"),
            FileCategory::Other         => write!(f, "other"),
        }
    }
}

/// One row of the static extension table. Every path resolves to exactly
/// one of these or to the `Unknown` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub family: Option<&'static str>,
    pub supports_complexity: bool,
}

// ─── Complexity ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysisResult {
    pub path: String,
    pub language: String,
    /// 0 when binary or the language does not support scoring, else >= 1.
    pub complexity: u32,
    pub lines: u64,
    pub bytes: u64,
    pub binary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hotspot {
    pub path: String,
    pub complexity: u32,
    pub lines: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplexitySummary {
    pub average_complexity: f64,
    pub max_complexity: u32,
    pub hotspots: Vec<Hotspot>,
}

// ─── Growth Series ────────────────────────────────────────────────────────────

/// Cumulative totals split by category. `total` is always the sum of the
/// five category fields; signed because deletions can push a net below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub application: i64,
    pub test: i64,
    pub build: i64,
    pub documentation: i64,
    pub other: i64,
    pub total: i64,
}

impl CategoryBreakdown {
    pub fn add(&mut self, category: FileCategory, delta: i64) {
        match category {
            FileCategory::Application   => self.application += delta,
            FileCategory::Test          => self.test += delta,
            FileCategory::Build         => self.build += delta,
            FileCategory::Documentation => self.documentation += delta,
            FileCategory::Other         => self.other += delta,
        }
        self.total += delta;
        debug_assert_eq!(self.category_sum(), self.total);
    }

    pub fn get(&self, category: FileCategory) -> i64 {
        match category {
            FileCategory::Application   => self.application,
            FileCategory::Test          => self.test,
            FileCategory::Build         => self.build,
            FileCategory::Documentation => self.documentation,
            FileCategory::Other         => self.other,
        }
    }

    pub fn category_sum(&self) -> i64 {
        self.application + self.test + self.build + self.documentation + self.other
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesPoint {
    pub period: String,
    pub commit_count: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub cumulative_lines: CategoryBreakdown,
    pub cumulative_bytes: CategoryBreakdown,
    pub commits: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinearSeriesPoint {
    pub index: usize,
    pub sha: String,
    pub net_lines: i64,
    pub cumulative_lines: CategoryBreakdown,
    pub cumulative_bytes: CategoryBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthSeries {
    pub time_series: Vec<TimeSeriesPoint>,
    pub linear_series: Vec<LinearSeriesPoint>,
}

// ─── File Heat ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FileHeatEntry {
    pub path: String,
    pub heat_score: f64,
    pub commit_count: usize,
    pub last_modified: i64,
    /// Net lines floored at 1, so every surviving file stays visible in
    /// area-proportional displays.
    pub total_lines: u64,
    pub language: String,
    pub category: FileCategory,
}

// ─── Awards ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TopFileStat {
    pub path: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitAward {
    pub sha: String,
    pub author: String,
    pub subject: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributorStat {
    pub author: String,
    pub commit_count: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub avg_lines_changed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopFiles {
    pub by_size: Vec<TopFileStat>,
    pub by_churn: Vec<TopFileStat>,
    pub by_complexity: Vec<TopFileStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Awards {
    pub top_contributors: Vec<ContributorStat>,
    pub most_files_touched: Vec<CommitAward>,
    pub most_lines_added: Vec<CommitAward>,
    pub most_lines_removed: Vec<CommitAward>,
    pub most_bytes_added: Vec<CommitAward>,
    pub most_bytes_removed: Vec<CommitAward>,
    pub lowest_avg_lines_changed: Option<ContributorStat>,
    pub highest_avg_lines_changed: Option<ContributorStat>,
}

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub repo_path: String,
    pub since: String,
    pub commit_count: usize,
    pub file_count: usize,
    pub granularity: String,
    pub analyzed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub growth: GrowthSeries,
    pub heat: Vec<FileHeatEntry>,
    pub complexity: Option<ComplexitySummary>,
    pub top_files: TopFiles,
    pub awards: Awards,
}

use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;

use crate::classify;
use crate::types::{
    CategoryBreakdown, CommitRecord, FileCategory, GrowthSeries, LinearSeriesPoint,
    TimeSeriesPoint,
};

// ─── Granularity ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day   => "day",
            Granularity::Week  => "week",
            Granularity::Month => "month",
        }
    }

    /// Normalizes a date to its bucket's first day (the date itself, the ISO
    /// week's Monday, or the first of the month).
    fn anchor(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn key(&self, anchor: NaiveDate) -> String {
        match self {
            Granularity::Day   => anchor.format("%Y-%m-%d").to_string(),
            Granularity::Week  => anchor.format("%G-W%V").to_string(),
            Granularity::Month => anchor.format("%Y-%m").to_string(),
        }
    }

    fn next(&self, anchor: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day   => anchor + Duration::days(1),
            Granularity::Week  => anchor + Duration::days(7),
            Granularity::Month => anchor + Months::new(1),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day"   => Ok(Granularity::Day),
            "week"  => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(format!(
                "Invalid granularity \"{other}\". Expected one of: \"day\", \"week\", \"month\""
            )),
        }
    }
}

// ─── Aggregation ──────────────────────────────────────────────────────────────

struct Bucket {
    key: String,
    anchor: NaiveDate,
    commit_count: usize,
    lines_added: u64,
    lines_deleted: u64,
    line_delta: CategoryBreakdown,
    byte_delta: CategoryBreakdown,
    commits: Vec<String>,
}

impl Bucket {
    fn new(key: String, anchor: NaiveDate) -> Self {
        Bucket {
            key,
            anchor,
            commit_count: 0,
            lines_added: 0,
            lines_deleted: 0,
            line_delta: CategoryBreakdown::default(),
            byte_delta: CategoryBreakdown::default(),
            commits: Vec::new(),
        }
    }
}

/// Builds both growth views in one pass over the (chronologically ascending)
/// commit list: the calendar-bucketed time series and the commit-ordered
/// linear series. Every line/byte delta is attributed to its file's
/// category; cumulative totals carry forward and never reset, so the final
/// point of both series must agree.
///
/// `retain_empty` keeps calendar buckets with zero commits in the output
/// (cumulative totals simply carry through them); omission never affects
/// the carry-forward.
pub fn aggregate(
    commits: &[CommitRecord],
    granularity: Granularity,
    retain_empty: bool,
) -> Result<GrowthSeries, String> {
    let mut linear_series: Vec<LinearSeriesPoint> = Vec::with_capacity(commits.len());
    let mut cum_lines = CategoryBreakdown::default();
    let mut cum_bytes = CategoryBreakdown::default();

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for (index, commit) in commits.iter().enumerate() {
        let date = Utc
            .timestamp_opt(commit.timestamp, 0)
            .single()
            .ok_or_else(|| {
                format!(
                    "Commit {} has an unrepresentable timestamp: {}",
                    commit.sha, commit.timestamp
                )
            })?
            .date_naive();
        let anchor = granularity.anchor(date);
        let key = granularity.key(anchor);

        let idx = *index_of.entry(key.clone()).or_insert_with(|| {
            buckets.push(Bucket::new(key, anchor));
            buckets.len() - 1
        });

        let mut net_lines = 0i64;
        for change in &commit.changes {
            let category = classify::classify_category(&change.path);
            let line_delta = change.lines_added as i64 - change.lines_deleted as i64;
            let byte_delta =
                change.bytes_added.unwrap_or(0) as i64 - change.bytes_deleted.unwrap_or(0) as i64;

            net_lines += line_delta;
            cum_lines.add(category, line_delta);
            cum_bytes.add(category, byte_delta);

            let bucket = &mut buckets[idx];
            bucket.lines_added += change.lines_added;
            bucket.lines_deleted += change.lines_deleted;
            bucket.line_delta.add(category, line_delta);
            bucket.byte_delta.add(category, byte_delta);
        }

        let bucket = &mut buckets[idx];
        bucket.commit_count += 1;
        bucket.commits.push(commit.sha.clone());

        linear_series.push(LinearSeriesPoint {
            index,
            sha: commit.sha.clone(),
            net_lines,
            cumulative_lines: cum_lines,
            cumulative_bytes: cum_bytes,
        });
    }

    // Stable sort: commit timestamps can jitter slightly out of order, but
    // cumulative carry-forward must run strictly bucket-by-bucket.
    buckets.sort_by_key(|b| b.anchor);

    let mut time_series: Vec<TimeSeriesPoint> = Vec::with_capacity(buckets.len());
    let mut run_lines = CategoryBreakdown::default();
    let mut run_bytes = CategoryBreakdown::default();
    let mut expected: Option<NaiveDate> = None;

    for bucket in buckets {
        if retain_empty {
            while let Some(gap) = expected {
                if gap >= bucket.anchor {
                    break;
                }
                time_series.push(TimeSeriesPoint {
                    period: granularity.key(gap),
                    commit_count: 0,
                    lines_added: 0,
                    lines_deleted: 0,
                    cumulative_lines: run_lines,
                    cumulative_bytes: run_bytes,
                    commits: Vec::new(),
                });
                expected = Some(granularity.next(gap));
            }
        }

        for category in FileCategory::ALL {
            run_lines.add(category, bucket.line_delta.get(category));
            run_bytes.add(category, bucket.byte_delta.get(category));
        }

        expected = Some(granularity.next(bucket.anchor));
        time_series.push(TimeSeriesPoint {
            period: bucket.key,
            commit_count: bucket.commit_count,
            lines_added: bucket.lines_added,
            lines_deleted: bucket.lines_deleted,
            cumulative_lines: run_lines,
            cumulative_bytes: run_bytes,
            commits: bucket.commits,
        });
    }

    Ok(GrowthSeries { time_series, linear_series })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

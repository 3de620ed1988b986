use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

use crate::types::{FileCategory, Report};

pub fn report_terminal(report: &Report) {
    eprintln!();
    println!(
        "{} — since \"{}\" ({} commits, {} files, by {})",
        "📜 git-chronicle".cyan().bold(),
        report.meta.since.bright_black(),
        report.meta.commit_count.to_string().bright_black(),
        report.meta.file_count.to_string().bright_black(),
        report.meta.granularity.bright_black(),
    );
    println!();

    // ── Growth summary ─────────────────────────────────────────────────────
    if let Some(last) = report.growth.time_series.last() {
        println!("{}", "📈 Repository growth (cumulative net lines):".cyan());
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["CATEGORY", "LINES"]);
        for category in FileCategory::ALL {
            table.add_row(vec![
                Cell::new(category.to_string()),
                lines_cell(last.cumulative_lines.get(category)),
            ]);
        }
        table.add_row(vec![
            Cell::new("total").add_attribute(Attribute::Bold),
            lines_cell(last.cumulative_lines.total).add_attribute(Attribute::Bold),
        ]);
        println!("{table}");
        println!(
            "    {} buckets, final period {}",
            report.growth.time_series.len().to_string().bright_black(),
            last.period.bright_black(),
        );
        println!();
    }

    // ── File heat ──────────────────────────────────────────────────────────
    if report.heat.is_empty() {
        println!("{}", "  No current files touched by the analyzed history.".yellow());
    } else {
        println!("{}", "🔥 Hottest files (frequency × recency):".cyan());
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["RANK", "FILE", "HEAT", "COMMITS", "LINES", "CATEGORY"]);
        for (i, entry) in report.heat.iter().take(15).enumerate() {
            table.add_row(vec![
                Cell::new(format!("{:3}", i + 1)),
                Cell::new(truncate_path(&entry.path, 44)),
                heat_cell(entry.heat_score),
                Cell::new(entry.commit_count.to_string()),
                Cell::new(entry.total_lines.to_string()),
                category_cell(entry.category),
            ]);
        }
        println!("{table}");
    }

    // ── Complexity ─────────────────────────────────────────────────────────
    if let Some(summary) = &report.complexity {
        println!();
        println!(
            "{} avg {} · max {}",
            "🧠 Complexity:".cyan(),
            format!("{:.2}", summary.average_complexity).bold(),
            summary.max_complexity.to_string().bold(),
        );
        for hotspot in summary.hotspots.iter().take(5) {
            println!(
                "    {} {}",
                hotspot.path.yellow(),
                format!("(complexity {}, {} lines)", hotspot.complexity, hotspot.lines)
                    .bright_black(),
            );
        }
    }

    // ── Awards ─────────────────────────────────────────────────────────────
    println!();
    println!("{}", "🏆 Awards:".cyan());
    if let Some(leader) = report.awards.top_contributors.first() {
        println!(
            "    {} {} {}",
            "•".white(),
            format!("Top contributor: {}", leader.author).bold(),
            format!("({} commits)", leader.commit_count).bright_black(),
        );
    }
    if let Some(biggest) = report.awards.most_lines_added.first() {
        println!(
            "    {} Largest addition: {} {}",
            "•".white(),
            short_sha(&biggest.sha).yellow(),
            format!("+{} lines — {}", biggest.value, biggest.subject).bright_black(),
        );
    }
    if let Some(purge) = report.awards.most_lines_removed.first() {
        println!(
            "    {} Largest removal: {} {}",
            "•".white(),
            short_sha(&purge.sha).yellow(),
            format!("-{} lines — {}", purge.value, purge.subject).bright_black(),
        );
    }
    if let Some(sprawl) = report.awards.most_files_touched.first() {
        println!(
            "    {} Widest commit: {} {}",
            "•".white(),
            short_sha(&sprawl.sha).yellow(),
            format!("{} files — {}", sprawl.value, sprawl.subject).bright_black(),
        );
    }
    if let (Some(low), Some(high)) = (
        &report.awards.lowest_avg_lines_changed,
        &report.awards.highest_avg_lines_changed,
    ) {
        println!(
            "    {} Avg lines changed per commit: {} {} … {} {}",
            "•".white(),
            low.author.bold(),
            format!("{:.1}", low.avg_lines_changed).bright_black(),
            high.author.bold(),
            format!("{:.1}", high.avg_lines_changed).bright_black(),
        );
    }

    if !report.top_files.by_churn.is_empty() {
        println!();
        println!("{}", "🔁 Most-changed files:".cyan());
        for stat in &report.top_files.by_churn {
            println!(
                "    {} {}",
                stat.path.yellow(),
                format!("({} changes)", stat.value).bright_black(),
            );
        }
    }

    println!();
}

// ─── Cell builders ────────────────────────────────────────────────────────────

/// Heat cell: numeric text plus a 5-char block bar scaled against 10.
/// Plain text (no embedded ANSI) so comfy-table measures real widths.
fn heat_cell(score: f64) -> Cell {
    let parts = ["", "▏", "▎", "▍", "▌", "▋", "▊", "▉", "█"];
    let scaled = (score * 4.0).round().clamp(0.0, 40.0) as usize;
    let filled = scaled / 8;
    let partial = parts[scaled % 8];
    let bar = "█".repeat(filled) + partial;
    Cell::new(format!("{score:5.1} {bar:<5}")).fg(Color::Red)
}

fn lines_cell(value: i64) -> Cell {
    if value < 0 {
        Cell::new(value.to_string()).fg(Color::Yellow)
    } else {
        Cell::new(value.to_string())
    }
}

fn category_cell(category: FileCategory) -> Cell {
    match category {
        FileCategory::Application   => Cell::new("application").fg(Color::Green),
        FileCategory::Test          => Cell::new("test").fg(Color::Cyan),
        FileCategory::Build         => Cell::new("build").fg(Color::Yellow),
        FileCategory::Documentation => Cell::new("documentation").fg(Color::Blue),
        FileCategory::Other         => Cell::new("other").fg(Color::DarkGrey),
    }
}

// ─── Other helpers ────────────────────────────────────────────────────────────

fn truncate_path(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(1);
    // Cut on a char boundary so multi-byte paths never split mid-character.
    let cut = s
        .char_indices()
        .rev()
        .nth(keep.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    format!("…{}", &s[cut..])
}

fn short_sha(sha: &str) -> &str {
    &sha[..sha.len().min(8)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_path_keeps_tail() {
        let long = "very/long/nested/path/to/some/deeply/buried/file.rs";
        let out = truncate_path(long, 20);
        assert!(out.chars().count() <= 20, "one char for the ellipsis plus 19 of path");
        assert!(out.ends_with("file.rs"), "the filename end must survive truncation");
        assert_eq!(truncate_path("short.rs", 20), "short.rs");
    }

    #[test]
    fn test_truncate_path_multibyte() {
        let long = "src/ユーザー管理/コンポーネント/設定ファイル変換処理.rs";
        let out = truncate_path(long, 20);
        assert!(out.starts_with('…'), "truncated path must carry the ellipsis");
        assert!(out.chars().count() <= 20, "char count must respect the limit");
        assert!(long.ends_with(&out['…'.len_utf8()..]), "the tail must survive intact");
        assert_eq!(truncate_path("設定.rs", 20), "設定.rs");
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("abcdef0123456789"), "abcdef01");
        assert_eq!(short_sha("abc"), "abc");
    }
}

mod analyzers;
mod classify;
mod config;
mod git;
mod reporters;
mod types;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use analyzers::temporal::Granularity;
use git::content::GitContentProvider;
use types::*;

#[derive(Parser, Debug)]
#[command(
    name = "git-chronicle",
    about = "📜 Turn git history into growth series, file heatmaps, and contributor awards",
    version,
    long_about = "Analyzes a local git repository's history and reports how the\n\
                  codebase grew (per file category, per calendar bucket and per\n\
                  commit), which files run hottest, where complexity sits, and\n\
                  who earned which leaderboard award."
)]
struct Args {
    /// Path to a git repository. Defaults to the current directory.
    #[arg(value_name = "PATH")]
    repo_path: Option<PathBuf>,

    /// Limit history, e.g. "6 months ago" or "2024-01-01" (default: all history)
    #[arg(long)]
    since: Option<String>,

    /// Cap on the number of commits analyzed (most recent first).
    #[arg(long)]
    max_commits: Option<usize>,

    /// Calendar bucket size for the time series: day, week, month [default: week]
    #[arg(long)]
    granularity: Option<String>,

    /// Keep calendar buckets with zero commits in the time series
    #[arg(long)]
    retain_empty_buckets: bool,

    /// Entries per ranking (awards, top files) [default: 5]
    #[arg(long)]
    top: Option<usize>,

    /// Files fetched per batch during complexity analysis [default: 10]
    #[arg(long)]
    batch_size: Option<usize>,

    /// Skip complexity analysis; complexity-derived views come out empty
    #[arg(long)]
    no_complexity: bool,

    /// Output format: terminal, json [default: terminal]
    #[arg(long)]
    format: Option<String>,

    /// Output file (json format only; omit for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Use a specific config file instead of auto-discovery
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print an annotated config template and exit
    #[arg(long)]
    generate_config: bool,
}

fn main() {
    let mut args = Args::parse();

    if args.generate_config {
        if let Err(e) = config::print_template(args.output.as_deref()) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let repo_path = args
        .repo_path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().expect("Failed to get current directory"));

    if !repo_path.join(".git").exists() {
        eprintln!("Error: not a git repository: {}", repo_path.display());
        eprintln!("       Make sure the path contains a .git directory.");
        std::process::exit(1);
    }

    // Config file fills in whatever the CLI left unset
    let config_path = args.config.clone().or_else(|| config::discover_config(&repo_path));
    if let Some(path) = config_path {
        match config::load_config(&path) {
            Ok(cfg) => apply_config(&mut args, &cfg),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    let granularity: Granularity = match args.granularity.as_deref().unwrap_or("week").parse() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_analysis(&repo_path, &args, granularity) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// CLI flags win unconditionally; config entries fill only the options
/// the command line left unset.
fn apply_config(args: &mut Args, cfg: &config::ChronicleConfig) {
    if args.since.is_none() {
        args.since = cfg.since.clone();
    }
    if args.max_commits.is_none() {
        args.max_commits = cfg.max_commits;
    }
    if args.granularity.is_none() {
        args.granularity = cfg.granularity.clone();
    }
    if !args.retain_empty_buckets {
        args.retain_empty_buckets = cfg.retain_empty_buckets.unwrap_or(false);
    }
    if args.top.is_none() {
        args.top = cfg.top;
    }
    if args.batch_size.is_none() {
        args.batch_size = cfg.batch_size;
    }
    if !args.no_complexity {
        args.no_complexity = cfg.no_complexity.unwrap_or(false);
    }
    if args.format.is_none() {
        args.format = cfg.format.clone();
    }
    if args.output.is_none() {
        args.output = cfg.output.as_ref().map(PathBuf::from);
    }
}

// ── Analysis pipeline ──────────────────────────────────────────────────────────

fn run_analysis(repo_path: &Path, args: &Args, granularity: Granularity) -> Result<(), String> {
    let since = args.since.as_deref().unwrap_or("");
    let top = args.top.unwrap_or(analyzers::awards::DEFAULT_TOP_N);
    let batch_size = args.batch_size.unwrap_or(analyzers::complexity::DEFAULT_BATCH_SIZE);
    let format = args.format.as_deref().unwrap_or("terminal");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(80));

    let total_start = Instant::now();
    let mut step_start = Instant::now();

    pb.set_message("[1/5] Parsing commit log...");
    let commits = git::log_parser::parse_log(repo_path, since, args.max_commits)?;
    if commits.is_empty() {
        pb.finish_and_clear();
        return Err(format!(
            "No commits found in '{}'. Try --since=\"4 years ago\"",
            repo_path.display()
        ));
    }
    let t1 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [1/5] Parsing commit log ({} commits)     {t1}", commits.len()));

    pb.set_message("[2/5] Listing current files...");
    let current_files = git::worktree::current_files(repo_path)?;
    let t2 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [2/5] Listing current files ({} files)    {t2}", current_files.len()));

    pb.set_message("[3/5] Aggregating growth, heat and awards...");
    let now = chrono::Utc::now().timestamp();
    let (growth, (heat, awards)) = rayon::join(
        || analyzers::temporal::aggregate(&commits, granularity, args.retain_empty_buckets),
        || {
            rayon::join(
                || analyzers::heat::rank_heat(&commits, &current_files, now),
                || analyzers::awards::calculate_awards(&commits, top),
            )
        },
    );
    let growth = growth?;
    let t3 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [3/5] Aggregating growth, heat and awards {t3}"));

    pb.set_message("[4/5] Scoring file complexity...");
    let analysis = if args.no_complexity {
        None
    } else {
        let provider = GitContentProvider::new(repo_path);
        let mut paths: Vec<String> = current_files.iter().cloned().collect();
        paths.sort();
        let cancel = AtomicBool::new(false);
        Some(analyzers::complexity::batch_analyze(
            &provider,
            "HEAD",
            &paths,
            batch_size,
            &cancel,
        ))
    };
    let t4 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    let step4_label = if args.no_complexity { "skipped" } else { "done" };
    pb.println(format!("  ✓ [4/5] Scoring file complexity ({step4_label})      {t4}"));

    pb.set_message("[5/5] Ranking top files...");
    let complexity = analysis.as_deref().map(analyzers::complexity::summarize);
    let top_files = analyzers::awards::top_files(&commits, analysis.as_deref(), top);
    let t5 = fmt_dur(step_start.elapsed());
    pb.println(format!("  ✓ [5/5] Ranking top files                   {t5}"));

    let total_time = fmt_dur(total_start.elapsed());
    pb.finish_and_clear();
    eprintln!(
        "✔ {} commits, {} current files — ⏱ {}",
        commits.len(),
        current_files.len(),
        total_time
    );

    let report = Report {
        meta: ReportMeta {
            repo_path: repo_path.display().to_string(),
            since: if since.is_empty() { "all history".to_string() } else { since.to_string() },
            commit_count: commits.len(),
            file_count: current_files.len(),
            granularity: granularity.as_str().to_string(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
        },
        growth,
        heat,
        complexity,
        top_files,
        awards,
    };

    match format {
        "json" => reporters::json::report_json(&report, args.output.as_deref())?,
        "terminal" => reporters::terminal::report_terminal(&report),
        other => {
            return Err(format!(
                "Unknown format \"{other}\". Expected one of: \"terminal\", \"json\""
            ))
        }
    }

    Ok(())
}

// ── Duration formatting ────────────────────────────────────────────────────────

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 { format!("{:.1}s", d.as_secs_f64()) } else { format!("{ms}ms") }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

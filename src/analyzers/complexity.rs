use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classify;
use crate::git::content::FileContentProvider;
use crate::types::{ComplexitySummary, FileAnalysisResult, Hotspot, LanguageInfo};

pub const DEFAULT_BATCH_SIZE: usize = 10;
const HOTSPOT_COUNT: usize = 10;

// Binary heuristic: any NUL byte, or more non-printable bytes than
// max(30% of content, 100).
const BINARY_FRACTION: f64 = 0.30;
const BINARY_MIN_COUNT: f64 = 100.0;

// ─── Decision-point tables ────────────────────────────────────────────────────

fn patterns(pairs: &[(&str, u32)]) -> Vec<(Regex, u32)> {
    pairs
        .iter()
        .map(|(pat, weight)| (Regex::new(pat).expect("complexity pattern"), *weight))
        .collect()
}

/// Per-family decision-point patterns, each an ordered (pattern, weight)
/// list. Static data: supporting a new language means adding a table row
/// here plus its registry entry in `classify`, nothing else.
static FAMILY_PATTERNS: Lazy<HashMap<&'static str, Vec<(Regex, u32)>>> = Lazy::new(|| {
    HashMap::from([
        ("c-like", patterns(&[
            (r"\bif\b", 1),
            (r"\bfor\b", 1),
            (r"\bwhile\b", 1),
            (r"\bcase\b", 1),
            (r"\bcatch\b", 1),
            (r"&&", 1),
            (r"\|\|", 1),
            (r"\s\?\s", 1), // ternary
        ])),
        ("rust", patterns(&[
            (r"\bif\b", 1),
            (r"\bwhile\b", 1),
            (r"\bfor\b", 1),
            (r"\bloop\b", 1),
            (r"\bmatch\b", 1),
            (r"&&", 1),
            (r"\|\|", 1),
        ])),
        ("python", patterns(&[
            (r"\bif\b", 1),
            (r"\belif\b", 1),
            (r"\bfor\b", 1),
            (r"\bwhile\b", 1),
            (r"\bexcept\b", 1),
            (r"\band\b", 1),
            (r"\bor\b", 1),
        ])),
        ("ruby", patterns(&[
            (r"\bif\b", 1),
            (r"\belsif\b", 1),
            (r"\bunless\b", 1),
            (r"\bwhile\b", 1),
            (r"\buntil\b", 1),
            (r"\bwhen\b", 1),
            (r"\brescue\b", 1),
            (r"&&", 1),
            (r"\|\|", 1),
        ])),
        ("shell", patterns(&[
            (r"\bif\b", 1),
            (r"\belif\b", 1),
            (r"\bfor\b", 1),
            (r"\bwhile\b", 1),
            (r"\buntil\b", 1),
            (r"\bcase\b", 1),
            (r"&&", 1),
            (r"\|\|", 1),
        ])),
    ])
});

/// Fallback set for languages with no family of their own.
static GENERIC_PATTERNS: Lazy<Vec<(Regex, u32)>> = Lazy::new(|| {
    patterns(&[
        (r"\bif\b", 1),
        (r"\bfor\b", 1),
        (r"\bwhile\b", 1),
        (r"\bcase\b", 1),
        (r"&&", 1),
        (r"\|\|", 1),
    ])
});

// ─── Per-file scoring ─────────────────────────────────────────────────────────

/// NUL byte → binary. Otherwise binary when non-printable bytes (excluding
/// tab/LF/CR) outnumber max(30% of content, 100). A heuristic with known
/// false positives/negatives; downstream output depends on it staying put.
pub fn is_binary(content: &[u8]) -> bool {
    if content.contains(&0) {
        return true;
    }
    let non_printable = content
        .iter()
        .filter(|&&b| (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r') || b == 0x7F)
        .count();
    non_printable as f64 > (content.len() as f64 * BINARY_FRACTION).max(BINARY_MIN_COUNT)
}

/// Cyclomatic estimate: 1 (the single path) plus occurrences × weight over
/// the language's decision-point table.
pub fn score_complexity(content: &str, language: &LanguageInfo) -> u32 {
    let table: &[(Regex, u32)] = language
        .family
        .and_then(|f| FAMILY_PATTERNS.get(f))
        .map(|v| v.as_slice())
        .unwrap_or_else(|| GENERIC_PATTERNS.as_slice());

    let mut score = 1u32;
    for (re, weight) in table {
        score += re.find_iter(content).count() as u32 * weight;
    }
    score
}

pub fn analyze_file(path: &str, content: &[u8]) -> FileAnalysisResult {
    let language = classify::detect_language(path);
    let binary = is_binary(content);

    let (lines, complexity) = if binary {
        (0, 0)
    } else {
        let text = String::from_utf8_lossy(content);
        let complexity = if language.supports_complexity {
            score_complexity(&text, language)
        } else {
            0
        };
        (text.lines().count() as u64, complexity)
    };

    FileAnalysisResult {
        path: path.to_string(),
        language: language.name.to_string(),
        complexity,
        lines,
        bytes: content.len() as u64,
        binary,
    }
}

/// Stand-in for a path whose content could not be retrieved. Flagged binary
/// so no downstream view mistakes it for scored text.
fn stub_result(path: &str) -> FileAnalysisResult {
    FileAnalysisResult {
        path: path.to_string(),
        language: classify::detect_language(path).name.to_string(),
        complexity: 0,
        lines: 0,
        bytes: 0,
        binary: true,
    }
}

// ─── Batch orchestration ──────────────────────────────────────────────────────

/// Analyzes `paths` at `revision` in fixed-size groups. Within a group every
/// content fetch runs in parallel; the next group starts only once the whole
/// group has settled, which bounds the number of git processes in flight.
///
/// A failed fetch yields a stub result and a warning — never an aborted
/// batch. `cancel` is checked between groups; cancelling returns whatever
/// finished so far.
pub fn batch_analyze<P: FileContentProvider>(
    provider: &P,
    revision: &str,
    paths: &[String],
    batch_size: usize,
    cancel: &AtomicBool,
) -> Vec<FileAnalysisResult> {
    let mut results: Vec<FileAnalysisResult> = Vec::with_capacity(paths.len());

    for group in paths.chunks(batch_size.max(1)) {
        if cancel.load(Ordering::Relaxed) {
            eprintln!(
                "⚠  Complexity analysis cancelled after {} of {} files",
                results.len(),
                paths.len()
            );
            break;
        }
        let analyzed: Vec<FileAnalysisResult> = group
            .par_iter()
            .map(|path| match provider.fetch(revision, path) {
                Ok(content) => analyze_file(path, &content),
                Err(e) => {
                    eprintln!("⚠  Could not analyze {path}: {e}");
                    stub_result(path)
                }
            })
            .collect();
        results.extend(analyzed);
    }

    results
}

// ─── Summary ──────────────────────────────────────────────────────────────────

pub fn summarize(results: &[FileAnalysisResult]) -> ComplexitySummary {
    let scored: Vec<&FileAnalysisResult> =
        results.iter().filter(|r| r.complexity > 0).collect();

    let average_complexity = if scored.is_empty() {
        0.0
    } else {
        let mean = scored.iter().map(|r| r.complexity as f64).sum::<f64>() / scored.len() as f64;
        (mean * 100.0).round() / 100.0
    };

    let max_complexity = scored.iter().map(|r| r.complexity).max().unwrap_or(0);

    let mut hotspots: Vec<&FileAnalysisResult> = scored;
    hotspots.sort_by(|a, b| {
        b.complexity
            .cmp(&a.complexity)
            .then_with(|| a.path.cmp(&b.path))
    });
    let hotspots = hotspots
        .into_iter()
        .take(HOTSPOT_COUNT)
        .map(|r| Hotspot {
            path: r.path.clone(),
            complexity: r.complexity,
            lines: r.lines,
        })
        .collect();

    ComplexitySummary {
        average_complexity,
        max_complexity,
        hotspots,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::content::ContentError;
    use std::collections::HashMap;

    struct MapProvider {
        files: HashMap<String, Vec<u8>>,
        failing: Vec<String>,
    }

    impl FileContentProvider for MapProvider {
        fn fetch(&self, revision: &str, path: &str) -> Result<Vec<u8>, ContentError> {
            if self.failing.iter().any(|f| f == path) {
                return Err(ContentError::Retrieval {
                    revision: revision.to_string(),
                    path: path.to_string(),
                    message: "forced failure".to_string(),
                });
            }
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| ContentError::NotFound {
                    revision: revision.to_string(),
                    path: path.to_string(),
                })
        }
    }

    #[test]
    fn test_is_binary_nul_byte() {
        assert!(is_binary(b"hello\0world"), "NUL byte must mean binary");
        assert!(is_binary(&[0u8]), "single NUL must mean binary");
    }

    #[test]
    fn test_is_binary_plain_text() {
        assert!(!is_binary(b"fn main() {\n\tprintln!(\"hi\");\r\n}\n"));
        assert!(!is_binary(b""), "empty content is not binary");
    }

    #[test]
    fn test_is_binary_non_printable_threshold() {
        // 200 control bytes in 200 bytes of content: count (200) > max(60, 100)
        let noisy: Vec<u8> = vec![0x01; 200];
        assert!(is_binary(&noisy), "mostly non-printable content is binary");
        // 50 control bytes in 10_000 bytes: 50 < max(3000, 100) → text
        let mut mostly_text = vec![b'a'; 9_950];
        mostly_text.extend(vec![0x01; 50]);
        assert!(!is_binary(&mostly_text), "sparse control bytes stay text");
    }

    #[test]
    fn test_score_complexity_floor_is_one() {
        let rust = classify::detect_language("a.rs");
        assert_eq!(score_complexity("", rust), 1, "empty content is one straight path");
        assert_eq!(score_complexity("let x = 5;", rust), 1);
    }

    #[test]
    fn test_score_complexity_counts_decision_points() {
        let rust = classify::detect_language("a.rs");
        // 2× if, 1× for, 1× && → 1 + 4
        let src = "if a && b { } if c { } for x in y { }";
        assert_eq!(score_complexity(src, rust), 5);
    }

    #[test]
    fn test_score_complexity_python_family() {
        let py = classify::detect_language("a.py");
        // if, elif, or → 1 + 3
        let src = "if a:\n    pass\nelif b or c:\n    pass\n";
        assert_eq!(score_complexity(src, py), 4);
    }

    #[test]
    fn test_score_complexity_generic_fallback() {
        // Lua has no family row and falls back to the generic table
        let lua = classify::detect_language("a.lua");
        let src = "if x then y() end\nwhile z do w() end\n";
        assert_eq!(score_complexity(src, lua), 3);
    }

    #[test]
    fn test_analyze_file_binary_has_zero_lines_and_complexity() {
        let result = analyze_file("blob.rs", b"\0\0\0\0");
        assert!(result.binary);
        assert_eq!(result.complexity, 0);
        assert_eq!(result.lines, 0);
        assert_eq!(result.bytes, 4, "byte size is always computed");
    }

    #[test]
    fn test_analyze_file_unsupported_language_scores_zero() {
        let result = analyze_file("README.md", b"# Title\n\nif you squint\n");
        assert!(!result.binary);
        assert_eq!(result.complexity, 0, "Markdown does not support complexity");
        assert_eq!(result.lines, 3);
    }

    #[test]
    fn test_analyze_file_supported_language() {
        let result = analyze_file("src/a.rs", b"if x {\n}\n");
        assert_eq!(result.language, "Rust");
        assert!(result.complexity >= 1, "non-binary scorable file must score >= 1");
        assert_eq!(result.lines, 2);
    }

    #[test]
    fn test_batch_analyze_isolates_one_failure_among_twelve() {
        let mut files = HashMap::new();
        let mut paths = Vec::new();
        for i in 0..12 {
            let path = format!("src/file{i}.rs");
            if i != 7 {
                files.insert(path.clone(), b"if a { }\n".to_vec());
            }
            paths.push(path);
        }
        let provider = MapProvider { files, failing: vec!["src/file7.rs".to_string()] };

        let results = batch_analyze(&provider, "HEAD", &paths, 10, &AtomicBool::new(false));

        assert_eq!(results.len(), 12, "one failure must not drop sibling results");
        let stubs: Vec<_> = results.iter().filter(|r| r.binary).collect();
        assert_eq!(stubs.len(), 1, "exactly the failed fetch becomes a stub");
        assert_eq!(stubs[0].path, "src/file7.rs");
        assert_eq!(stubs[0].complexity, 0);
        assert!(
            results.iter().filter(|r| !r.binary).all(|r| r.complexity >= 1),
            "the remaining 11 score normally"
        );
    }

    #[test]
    fn test_batch_analyze_preserves_input_order() {
        let files: HashMap<String, Vec<u8>> = (0..25)
            .map(|i| (format!("f{i:02}.rs"), b"x".to_vec()))
            .collect();
        let paths: Vec<String> = (0..25).map(|i| format!("f{i:02}.rs")).collect();
        let provider = MapProvider { files, failing: vec![] };

        let results = batch_analyze(&provider, "HEAD", &paths, 10, &AtomicBool::new(false));
        let got: Vec<&str> = results.iter().map(|r| r.path.as_str()).collect();
        let want: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        assert_eq!(got, want, "results must line up with the input path order");
    }

    #[test]
    fn test_batch_analyze_cancel_stops_between_groups() {
        let files: HashMap<String, Vec<u8>> = (0..30)
            .map(|i| (format!("f{i}.rs"), b"x".to_vec()))
            .collect();
        let paths: Vec<String> = (0..30).map(|i| format!("f{i}.rs")).collect();
        let provider = MapProvider { files, failing: vec![] };

        let cancel = AtomicBool::new(true);
        let results = batch_analyze(&provider, "HEAD", &paths, 10, &cancel);
        assert!(results.is_empty(), "a pre-set cancel flag stops before the first group");
    }

    #[test]
    fn test_summarize_average_and_max() {
        let results = vec![
            analyze_file("a.rs", b"if a { } if b { }\n"), // 3
            analyze_file("b.rs", b"if a { }\n"),          // 2
            analyze_file("c.md", b"plain\n"),             // 0, excluded
        ];
        let summary = summarize(&results);
        assert_eq!(summary.max_complexity, 3);
        assert_eq!(summary.average_complexity, 2.5, "mean of strictly-positive scores");
    }

    #[test]
    fn test_summarize_empty_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.average_complexity, 0.0);
        assert_eq!(summary.max_complexity, 0);
        assert!(summary.hotspots.is_empty());
    }

    #[test]
    fn test_summarize_hotspots_top_ten_by_complexity() {
        let results: Vec<FileAnalysisResult> = (0..15)
            .map(|i| FileAnalysisResult {
                path: format!("f{i:02}.rs"),
                language: "Rust".to_string(),
                complexity: (i + 1) as u32,
                lines: 10,
                bytes: 100,
                binary: false,
            })
            .collect();
        let summary = summarize(&results);
        assert_eq!(summary.hotspots.len(), 10);
        assert_eq!(summary.hotspots[0].complexity, 15, "hotspots are sorted descending");
        assert_eq!(summary.hotspots[9].complexity, 6);
    }
}

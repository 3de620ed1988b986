use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::types::{FileCategory, LanguageInfo};

// ─── Language registry ────────────────────────────────────────────────────────

/// Sentinel for paths no table row matches. Classification never fails.
pub static UNKNOWN: LanguageInfo = LanguageInfo {
    name: "Unknown",
    family: None,
    supports_complexity: false,
};

/// Extensionless dotfiles (.gitignore, .npmrc, ...) — config-like by convention.
static CONFIG: LanguageInfo = LanguageInfo {
    name: "Config",
    family: None,
    supports_complexity: false,
};

const fn lang(name: &'static str, family: Option<&'static str>, complexity: bool) -> LanguageInfo {
    LanguageInfo { name, family, supports_complexity: complexity }
}

/// Extension → language. Pure static data: new languages are added by
/// inserting a row here, never by adding code branches.
static LANGUAGES: Lazy<HashMap<&'static str, LanguageInfo>> = Lazy::new(|| {
    HashMap::from([
        ("rs",       lang("Rust",             Some("rust"),   true)),
        ("js",       lang("JavaScript",       Some("c-like"), true)),
        ("jsx",      lang("JavaScript",       Some("c-like"), true)),
        ("mjs",      lang("JavaScript",       Some("c-like"), true)),
        ("cjs",      lang("JavaScript",       Some("c-like"), true)),
        ("ts",       lang("TypeScript",       Some("c-like"), true)),
        ("tsx",      lang("TypeScript",       Some("c-like"), true)),
        ("py",       lang("Python",           Some("python"), true)),
        ("rb",       lang("Ruby",             Some("ruby"),   true)),
        ("go",       lang("Go",               Some("c-like"), true)),
        ("java",     lang("Java",             Some("c-like"), true)),
        ("kt",       lang("Kotlin",           Some("c-like"), true)),
        ("kts",      lang("Kotlin",           Some("c-like"), true)),
        ("c",        lang("C",                Some("c-like"), true)),
        ("h",        lang("C",                Some("c-like"), true)),
        ("cpp",      lang("C++",              Some("c-like"), true)),
        ("cc",       lang("C++",              Some("c-like"), true)),
        ("cxx",      lang("C++",              Some("c-like"), true)),
        ("hpp",      lang("C++",              Some("c-like"), true)),
        ("cs",       lang("C#",               Some("c-like"), true)),
        ("php",      lang("PHP",              Some("c-like"), true)),
        ("swift",    lang("Swift",            Some("c-like"), true)),
        ("scala",    lang("Scala",            Some("c-like"), true)),
        ("sh",       lang("Shell",            Some("shell"),  true)),
        ("bash",     lang("Shell",            Some("shell"),  true)),
        ("zsh",      lang("Shell",            Some("shell"),  true)),
        ("pl",       lang("Perl",             Some("c-like"), true)),
        ("lua",      lang("Lua",              None,           true)),
        ("vue",      lang("Vue",              Some("c-like"), true)),
        ("svelte",   lang("Svelte",           Some("c-like"), true)),
        ("html",     lang("HTML",             None,           false)),
        ("css",      lang("CSS",              None,           false)),
        ("scss",     lang("Sass",             None,           false)),
        ("less",     lang("Less",             None,           false)),
        ("sql",      lang("SQL",              None,           false)),
        ("json",     lang("JSON",             None,           false)),
        ("yaml",     lang("YAML",             None,           false)),
        ("yml",      lang("YAML",             None,           false)),
        ("toml",     lang("TOML",             None,           false)),
        ("xml",      lang("XML",              None,           false)),
        ("md",       lang("Markdown",         None,           false)),
        ("markdown", lang("Markdown",         None,           false)),
        ("rst",      lang("reStructuredText", None,           false)),
        ("txt",      lang("Plain Text",       None,           false)),
    ])
});

/// Name-based rules for extensionless files.
static SPECIAL_NAMES: Lazy<HashMap<&'static str, LanguageInfo>> = Lazy::new(|| {
    HashMap::from([
        ("dockerfile",  lang("Docker", Some("shell"), false)),
        ("makefile",    lang("Make",   None,          false)),
        ("gnumakefile", lang("Make",   None,          false)),
        ("rakefile",    lang("Ruby",   Some("ruby"),  true)),
        ("gemfile",     lang("Ruby",   Some("ruby"),  true)),
        ("justfile",    lang("Make",   None,          false)),
        ("vagrantfile", lang("Ruby",   Some("ruby"),  true)),
        ("jenkinsfile", lang("Groovy", Some("c-like"), true)),
    ])
});

/// Maps any path to exactly one language: extension match (case-insensitive),
/// then well-known extensionless names, then the dotfile heuristic, then
/// the `Unknown` sentinel.
pub fn detect_language(path: &str) -> &'static LanguageInfo {
    let filename = path.rsplit('/').next().unwrap_or(path);
    match extension_of(filename) {
        Some(ext) => LANGUAGES.get(ext.to_ascii_lowercase().as_str()).unwrap_or(&UNKNOWN),
        None => {
            let lower = filename.to_ascii_lowercase();
            if let Some(info) = SPECIAL_NAMES.get(lower.as_str()) {
                info
            } else if filename.starts_with('.') {
                &CONFIG
            } else {
                &UNKNOWN
            }
        }
    }
}

/// The extension after the last dot, if any. A leading dot alone
/// (".gitignore") is a dotfile name, not an extension.
fn extension_of(filename: &str) -> Option<&str> {
    match filename.rfind('.') {
        Some(i) if i > 0 && i + 1 < filename.len() => Some(&filename[i + 1..]),
        _ => None,
    }
}

// ─── Category rules ───────────────────────────────────────────────────────────

static TEST_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from([
    "test", "tests", "__tests__", "spec", "specs", "e2e", "testdata", "fixtures",
]));

static BUILD_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from([
    ".github", ".gitlab", ".circleci", "ci", ".cargo",
]));

static BUILD_FILENAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from([
    "dockerfile", "makefile", "gnumakefile", "justfile", "jenkinsfile",
    "cmakelists.txt", "build.gradle", "settings.gradle", "pom.xml",
    "package.json", "cargo.toml", "cargo.lock", "gemfile", "rakefile",
]));

static BUILD_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from([
    "toml", "yaml", "yml", "ini", "cfg", "properties", "lock", "gradle", "cmake", "mk",
]));

static DOC_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from([
    "doc", "docs", "documentation", "man",
]));

static DOC_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from([
    "md", "markdown", "rst", "adoc", "txt",
]));

/// Coarse purpose classification. The rules run in a fixed order — test,
/// then build/config, then documentation — and the first match wins; report
/// output is only reproducible if this order never changes.
pub fn classify_category(path: &str) -> FileCategory {
    if is_test_path(path) {
        FileCategory::Test
    } else if is_build_path(path) {
        FileCategory::Build
    } else if is_documentation_path(path) {
        FileCategory::Documentation
    } else if detect_language(path).supports_complexity {
        FileCategory::Application
    } else {
        FileCategory::Other
    }
}

fn is_test_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let segments: Vec<&str> = lower.split('/').collect();
    let filename = segments.last().copied().unwrap_or("");

    if segments[..segments.len().saturating_sub(1)]
        .iter()
        .any(|seg| TEST_DIRS.contains(seg))
    {
        return true;
    }
    filename.contains(".test.")
        || filename.contains(".spec.")
        || filename.starts_with("test_")
        || filename
            .rsplit_once('.')
            .is_some_and(|(stem, _)| stem.ends_with("_test") || stem.ends_with("_spec"))
}

fn is_build_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let segments: Vec<&str> = lower.split('/').collect();
    let filename = segments.last().copied().unwrap_or("");

    if segments[..segments.len().saturating_sub(1)]
        .iter()
        .any(|seg| BUILD_DIRS.contains(seg))
    {
        return true;
    }
    if BUILD_FILENAMES.contains(filename) {
        return true;
    }
    extension_of(filename)
        .is_some_and(|ext| BUILD_EXTENSIONS.contains(ext))
}

fn is_documentation_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let segments: Vec<&str> = lower.split('/').collect();
    let filename = segments.last().copied().unwrap_or("");

    if segments[..segments.len().saturating_sub(1)]
        .iter()
        .any(|seg| DOC_DIRS.contains(seg))
    {
        return true;
    }
    if filename == "license" || filename == "readme" || filename == "changelog" {
        return true;
    }
    extension_of(filename)
        .is_some_and(|ext| DOC_EXTENSIONS.contains(ext))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

pub mod content;
pub mod log_parser;
pub mod worktree;

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Content retrieval failures must stay distinguishable: a missing path is
/// expected (renames, submodules) while a broken retrieval is not.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("'{path}' does not exist at revision {revision}")]
    NotFound { revision: String, path: String },

    #[error("failed to retrieve '{path}' at revision {revision}: {message}")]
    Retrieval {
        revision: String,
        path: String,
        message: String,
    },
}

/// Fetches one file's content as of one revision. The complexity scorer
/// calls this from rayon workers, hence the `Sync` bound.
pub trait FileContentProvider: Sync {
    fn fetch(&self, revision: &str, path: &str) -> Result<Vec<u8>, ContentError>;
}

/// `git show <rev>:<path>` backed provider.
pub struct GitContentProvider {
    repo: PathBuf,
}

impl GitContentProvider {
    pub fn new(repo: &Path) -> Self {
        GitContentProvider { repo: repo.to_path_buf() }
    }
}

impl FileContentProvider for GitContentProvider {
    fn fetch(&self, revision: &str, path: &str) -> Result<Vec<u8>, ContentError> {
        let output = Command::new("git")
            .args(["show", &format!("{revision}:{path}")])
            .current_dir(&self.repo)
            .output()
            .map_err(|e| ContentError::Retrieval {
                revision: revision.to_string(),
                path: path.to_string(),
                message: format!("failed to run git: {e}"),
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("does not exist") || stderr.contains("exists on disk, but not in") {
            Err(ContentError::NotFound {
                revision: revision.to_string(),
                path: path.to_string(),
            })
        } else {
            Err(ContentError::Retrieval {
                revision: revision.to_string(),
                path: path.to_string(),
                message: stderr.trim().to_string(),
            })
        }
    }
}

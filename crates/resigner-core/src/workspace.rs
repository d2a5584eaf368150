//! Per-operation working directories

use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;

/// A private working directory for one resign operation.
///
/// Directories live under `<system temp>/<kind>/` and are named with the
/// operation key plus a unique suffix, so concurrent operations on
/// identically named inputs cannot collide on the same path. The directory
/// is removed when the workspace is closed or dropped; removal failures are
/// logged and swallowed so cleanup can never mask the primary outcome.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh working directory under `<system temp>/<kind>/`.
    pub fn create(kind: &str, key: &str) -> Result<Self> {
        let root = std::env::temp_dir().join(kind);
        std::fs::create_dir_all(&root)?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", sanitize_key(key)))
            .tempdir_in(&root)?;

        debug!(path = %dir.path().display(), "created working directory");
        Ok(Self { dir })
    }

    /// The working directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the working directory, logging any deletion failure.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!(path = %path.display(), %err, "failed to remove working directory");
        }
    }
}

/// Reduce an operation key to a safe directory-name fragment.
fn sanitize_key(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "op".to_string()
    } else {
        sanitized
    }
}

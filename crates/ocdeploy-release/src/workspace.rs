//! Per-release working directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{ReleaseError, ReleaseResult};

const PREFIX: &str = "ocdepl-";

/// Uniquely named scratch directory holding the release checkout.
///
/// Dropping it also removes the tree; [`WorkDir::cleanup`] does the same
/// but logs a failure instead of ignoring it.
#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Create a fresh directory under `root`, creating `root` if needed.
    pub fn create(root: &Path) -> ReleaseResult<Self> {
        std::fs::create_dir_all(root).map_err(|source| ReleaseError::Workspace {
            path: root.to_path_buf(),
            source,
        })?;
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(root)
            .map_err(|source| ReleaseError::Workspace {
                path: root.to_path_buf(),
                source,
            })?;
        debug!(path = %dir.path().display(), "working directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory. Failure is logged and never replaces the
    /// release's own outcome.
    pub fn cleanup(self) {
        let path: PathBuf = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "working directory removed"),
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "failed to remove working directory"
            ),
        }
    }
}

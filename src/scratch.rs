//! Run-scoped local working directory
//!
//! One [`ScratchSpace`] is created per pipeline run and handed to the
//! components that need local files (downloaded data files, staged CSV
//! output). It is removed when the run closes it, or when it is dropped.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh directory under the system temp dir
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("ncload-").tempdir()?;
        debug!("Created scratch space {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a fresh directory under `parent`
    pub fn create_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("ncload-")
            .tempdir_in(parent)?;
        debug!("Created scratch space {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Remove the directory and everything left in it
    pub fn close(self) -> io::Result<()> {
        debug!("Removing scratch space {}", self.dir.path().display());
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_removes_directory() {
        let scratch = ScratchSpace::create().unwrap();
        let root = scratch.to_path_buf();
        std::fs::write(root.join("leftover.csv"), "x").unwrap();

        scratch.close().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_create_in_parent() {
        let parent = TempDir::new().unwrap();
        let scratch = ScratchSpace::create_in(parent.path()).unwrap();
        assert!(scratch.path().starts_with(parent.path()));
    }
}

//! Per-job scratch directory for converted intermediates.
//!
//! Every job gets its own randomly suffixed directory, so two jobs running
//! side by side (even with the same working directory) never see each
//! other's files. The directory is owned by the [`TempWorkspace`] value:
//! dropping it removes the tree, which covers early returns and panics.
//! Call [`TempWorkspace::close`] on the normal path to log removal
//! problems instead of silently ignoring them.

use crate::config::MergeConfig;
use crate::error::DocMergeError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A uniquely named temporary directory owned by one job.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    /// Create a fresh workspace under the configured temp root.
    pub fn create(config: &MergeConfig) -> Result<Self, DocMergeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.temp_prefix);

        let dir = match config.temp_root {
            Some(ref root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| DocMergeError::Internal(format!("Failed to create temp workspace: {e}")))?;

        debug!("Created temp workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A subdirectory reserved for the input at `index`.
    ///
    /// Created on demand; repeated calls return the same directory.
    pub fn slot(&self, index: usize) -> Result<PathBuf, DocMergeError> {
        let slot = self.dir.path().join(format!("{index:04}"));
        std::fs::create_dir_all(&slot).map_err(|e| {
            DocMergeError::Internal(format!(
                "Failed to create workspace slot {}: {e}",
                slot.display()
            ))
        })?;
        Ok(slot)
    }

    /// Remove the workspace now, logging instead of failing on error.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("Removed temp workspace {}", path.display()),
            Err(e) => warn!("Could not remove temp workspace {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(root: &Path) -> MergeConfig {
        MergeConfig::builder().temp_root(root).build().unwrap()
    }

    #[test]
    fn workspaces_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        let a = TempWorkspace::create(&config).unwrap();
        let b = TempWorkspace::create(&config).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(root.path()));
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("docmerge-"), "got {name}");
    }

    #[test]
    fn close_removes_tree_with_contents() {
        let root = tempfile::tempdir().unwrap();
        let ws = TempWorkspace::create(&config_in(root.path())).unwrap();
        let slot = ws.slot(3).unwrap();
        std::fs::write(slot.join("x.pdf"), b"%PDF-").unwrap();
        let path = ws.path().to_path_buf();
        ws.close();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_tree() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let ws = TempWorkspace::create(&config_in(root.path())).unwrap();
            ws.slot(0).unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn slot_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let ws = TempWorkspace::create(&config_in(root.path())).unwrap();
        assert_eq!(ws.slot(1).unwrap(), ws.slot(1).unwrap());
        assert_ne!(ws.slot(1).unwrap(), ws.slot(2).unwrap());
    }
}

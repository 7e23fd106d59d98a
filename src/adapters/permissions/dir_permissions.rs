use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::traits::permission::PermissionProvider;

/// Read permission backed by the filesystem and a list of pre-approved
/// directories.
///
/// A file may be read without asking when the process can open it and it
/// lives below one of `allowed_dirs`. Anything else has to be approved by the
/// user, which the CLI does with a prompt.
#[derive(Debug, Clone, Default)]
pub struct DirPermissions {
    allowed_dirs: Vec<PathBuf>,
}

impl DirPermissions {
    /// Allowed directories that do not exist are ignored.
    pub fn new(allowed_dirs: Vec<PathBuf>) -> Self {
        let allowed_dirs = allowed_dirs
            .into_iter()
            .filter_map(|dir| dir.canonicalize().ok())
            .collect();
        Self { allowed_dirs }
    }

    pub fn allowed_dirs(&self) -> &[PathBuf] {
        &self.allowed_dirs
    }
}

impl PermissionProvider for DirPermissions {
    fn check_read_permission(&self, path: &Path) -> bool {
        if File::open(path).is_err() {
            return false;
        }
        let Ok(canonical) = path.canonicalize() else {
            return false;
        };
        self.allowed_dirs.iter().any(|dir| canonical.starts_with(dir))
    }

    fn request_permission(&mut self, path: &Path) {
        debug!(file = %path.display(), "read permission requested");
    }
}

use std::path::{Path, PathBuf};

/// Holds the one file selection that is waiting for a read-permission
/// decision.
#[derive(Debug, Default)]
pub struct PermissionGate {
    pending: Option<PathBuf>,
}

impl PermissionGate {
    /// Park `file` until the permission decision comes back. A newer
    /// selection replaces an older one.
    pub fn suspend(&mut self, file: PathBuf) {
        if let Some(previous) = self.pending.replace(file) {
            tracing::debug!(file = %previous.display(), "pending file selection replaced");
        }
    }

    /// Resolve the decision. Returns the file to look up when access was
    /// granted; a denial simply forgets the selection.
    pub fn resolve(&mut self, granted: bool) -> Option<PathBuf> {
        let pending = self.pending.take();
        if granted { pending } else { None }
    }

    pub fn pending(&self) -> Option<&Path> {
        self.pending.as_deref()
    }
}

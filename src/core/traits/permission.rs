use std::path::Path;

/// Port for read-permission checks on user-selected files.
pub trait PermissionProvider {
    fn check_read_permission(&self, path: &Path) -> bool;

    /// Ask for permission to read `path`. The decision arrives later as
    /// `WorkflowEvent::PermissionResolved`.
    fn request_permission(&mut self, path: &Path);
}

pub mod key_operations;
pub mod lookup;
pub mod permission;
pub mod view;

use key_operations::KeyOperations;
use lookup::LookupDispatcher;
use permission::PermissionProvider;

/// Everything the workflow needs from the outside world besides the view.
pub trait TokenBackend: LookupDispatcher + KeyOperations + PermissionProvider {}

impl<T> TokenBackend for T where T: LookupDispatcher + KeyOperations + PermissionProvider {}

pub mod dir_permissions;

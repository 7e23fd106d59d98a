pub mod hooks;
pub mod log_export;
pub mod permissions;

pub mod hook_backend;
pub mod protocol;
pub mod runner;

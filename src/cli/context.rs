use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Project-local directory created by `tokenbind init`.
pub const PROJECT_DIR: &str = ".tokenbind";

const CONFIG_FILE: &str = "config.toml";

static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global config path.
///
/// An explicit `--config` wins. Otherwise the project config is used when it
/// exists, then the per-user one. If neither exists the project path is kept
/// so the "not found" error points at the place `init` would write to.
pub fn init(custom: Option<&Path>) {
    let path = custom
        .map(Path::to_path_buf)
        .unwrap_or_else(discover_config);
    tracing::debug!(config = %path.display(), "using config");
    let _ = CONFIG_PATH.set(path);
}

/// Get the config path chosen by [`init`].
pub fn config_path() -> PathBuf {
    CONFIG_PATH.get().cloned().unwrap_or_else(project_config)
}

fn project_config() -> PathBuf {
    Path::new(PROJECT_DIR).join(CONFIG_FILE)
}

fn user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tokenbind").join(CONFIG_FILE))
}

fn discover_config() -> PathBuf {
    let project = project_config();
    if project.exists() {
        return project;
    }
    user_config()
        .filter(|path| path.exists())
        .unwrap_or(project)
}

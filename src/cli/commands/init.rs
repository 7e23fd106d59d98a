use std::path::Path;

use crate::cli::context::PROJECT_DIR;
use crate::cli::output;
use crate::config::app_config::CURRENT_FORMAT_VERSION;
use crate::core::errors::{Result, TokenbindError};

/// Execute the `tokenbind init` command.
///
/// Creates `.tokenbind/config.toml` with every hook left commented out.
pub fn execute(verbose: bool) -> Result<()> {
    let project_dir = Path::new(PROJECT_DIR);
    let config_path = project_dir.join("config.toml");

    if config_path.exists() {
        return Err(TokenbindError::InvalidConfig {
            detail: format!(
                "tokenbind is already initialized here ({} exists)",
                config_path.display()
            ),
        });
    }

    output::header("tokenbind: initializing");

    std::fs::create_dir_all(project_dir)?;
    std::fs::write(&config_path, config_template())?;
    output::success(&format!("Generated {}", config_path.display()));

    if verbose {
        println!("\n  Each hook is a program that reads one JSON request on stdin");
        println!("  and answers with one JSON object on stdout.");
    }

    output::header("Next steps");
    println!("  1. Point the [hooks] entries at your lookup and key tools");
    println!("  2. tokenbind resolve --token token.json");

    Ok(())
}

fn config_template() -> String {
    format!(
        r#"[tokenbind]
version = "{version}"
format_version = {CURRENT_FORMAT_VERSION}

[hooks]
# Lookup chain, tried in this order until one finds the key.
# local = ["my-keytool", "lookup-local"]
# url = ["my-keytool", "fetch-url"]
# keyserver = ["my-keytool", "search-keyserver"]

# Reads the key from a file the user picked.
# content_file = ["my-keytool", "read-file"]

# import = ["my-keytool", "import"]
# promote = ["my-keytool", "promote"]
# reset = ["my-keytool", "reset-token"]

timeout_secs = 60

[permissions]
# Key files below these directories are read without asking.
allowed_dirs = []
"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::app_config::AppConfig;

    #[test]
    fn template_is_a_valid_config() {
        let config = AppConfig::parse(&config_template()).unwrap();
        assert_eq!(config.tokenbind.format_version, CURRENT_FORMAT_VERSION);
        assert!(config.hooks.local.is_none());
        assert_eq!(config.hooks.timeout_secs, 60);
    }
}

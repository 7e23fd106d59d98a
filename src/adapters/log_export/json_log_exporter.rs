use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, TokenbindError};
use crate::core::models::result_log::LogSnapshot;

/// Writes a result log to disk as JSON lines, one entry per line.
///
/// Key material never reaches the file; entries only carry a digest of it.
pub struct JsonLogExporter {
    path: PathBuf,
}

impl JsonLogExporter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write `snapshot`, replacing any previous export at the same path.
    pub fn export(&self, snapshot: &LogSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path).map_err(|e| TokenbindError::LogExport {
            detail: format!("Cannot create {}: {e}", self.path.display()),
        })?;
        let mut writer = BufWriter::new(file);

        for entry in snapshot.entries() {
            let line = serde_json::to_string(entry).map_err(|e| TokenbindError::LogExport {
                detail: format!("Failed to serialize log entry: {e}"),
            })?;
            writeln!(writer, "{line}").map_err(|e| TokenbindError::LogExport {
                detail: format!("Failed to write log entry: {e}"),
            })?;
        }

        writer.flush().map_err(|e| TokenbindError::LogExport {
            detail: format!("Failed to write {}: {e}", self.path.display()),
        })?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

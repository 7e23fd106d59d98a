use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::models::lookup::LookupSource;
use crate::core::models::operation_result::OperationResult;

/// Which sub-operation produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum LogOrigin {
    Lookup(LookupSource),
    Import,
    Promote,
}

/// One recorded sub-operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub origin: LogOrigin,
    pub success: bool,
    pub messages: Vec<String>,
    /// SHA-256 of retrieved key material. The bytes themselves are never logged.
    pub key_digest: Option<String>,
}

/// Append-only record of every lookup, import and promotion in a run.
#[derive(Debug, Default)]
pub struct ResultLog {
    entries: Vec<LogEntry>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, origin: LogOrigin, result: &OperationResult, key_data: Option<&[u8]>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            origin,
            success: result.success,
            messages: result.messages.clone(),
            key_digest: key_data.map(sha256_hex),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Freeze the current contents for a viewer.
    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot(self.entries.as_slice().into())
    }
}

/// Immutable copy of the log handed to the log viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSnapshot(Arc<[LogEntry]>);

impl LogSnapshot {
    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    /// True when every recorded operation succeeded.
    pub fn is_clean(&self) -> bool {
        self.0.iter().all(|e| e.success)
    }
}

/// Compute the SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

use serde::{Deserialize, Serialize};

/// Outcome of one collaborator operation (a lookup, an import, a promotion
/// or a token reset) as reported by the collaborator itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    /// Human-readable lines, in the order the collaborator produced them.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
        }
    }

    /// First message, used as the one-line summary in listings.
    pub fn summary(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or("")
    }
}

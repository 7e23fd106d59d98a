use std::path::PathBuf;

/// All domain errors for tokenbind.
///
/// Recoverable workflow outcomes (a source that finds nothing, a failed
/// import or promotion, a denied permission) are not errors: they are
/// recorded in the result log and surfaced through the view. Only broken
/// collaborator contracts and problems with the tool's own inputs end up here.
#[derive(Debug, thiserror::Error)]
pub enum TokenbindError {
    #[error(
        "Collaborator contract violated: {detail}\n\n  \
         A lookup or key operation reported something that cannot happen.\n  \
         This is a bug in the hook that produced it, not in your token.\n  \
         Re-run with --verbose to see the raw exchange."
    )]
    ContractViolation { detail: String },

    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Invalid token descriptor: {detail}\n\n  \
         Expected a JSON file with the fields:\n    \
         fingerprints, aid, fingerprint_sign, and optionally url"
    )]
    InvalidToken { detail: String },

    #[error("Hook '{hook}' could not be run: {reason}")]
    HookFailed { hook: String, reason: String },

    #[error("Hook '{hook}' returned an unreadable response: {detail}")]
    HookProtocol { hook: String, detail: String },

    #[error("Token reset failed: {reason}")]
    ResetFailed { reason: String },

    #[error("Could not export the operation log: {detail}")]
    LogExport { detail: String },

    #[error(
        "No key was bound to the token\n\n  \
         Solutions:\n    \
         → Check the lookup hooks in config.toml: tokenbind resolve --verbose\n    \
         → Load the public key from a file: tokenbind resolve --file <key.asc>"
    )]
    NotResolved,

    #[error(
        "This configuration uses format version {config_version}, but this tokenbind \
         only supports up to version {supported_version}.\n\n  \
         Update tokenbind or regenerate the config with 'tokenbind init'."
    )]
    FormatVersionTooNew {
        config_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TokenbindError {
    /// Shorthand for the fatal contract-violation class.
    pub fn contract(detail: impl Into<String>) -> Self {
        Self::ContractViolation {
            detail: detail.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TokenbindError>;

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TokenbindError};

/// v4 fingerprints are 20 bytes, v5 fingerprints 32 bytes.
static FINGERPRINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9A-F]{40}|[0-9A-F]{64})$").expect("valid regex"));

static AID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9A-F]{2}){1,32}$").expect("valid regex"));

/// Strip the separators people paste fingerprints with, drop one `0x`
/// prefix and upper-case the rest.
fn normalize_hex(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact)
        .to_ascii_uppercase()
}

/// An OpenPGP key fingerprint, stored as upper-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = TokenbindError;

    fn try_from(raw: String) -> Result<Self> {
        let hex = normalize_hex(&raw);
        if !FINGERPRINT_RE.is_match(&hex) {
            return Err(TokenbindError::InvalidToken {
                detail: format!("'{raw}' is not a 40 or 64 digit hex fingerprint"),
            });
        }
        Ok(Self(hex))
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application identifier of the token's OpenPGP applet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Aid(Vec<u8>);

impl TryFrom<String> for Aid {
    type Error = TokenbindError;

    fn try_from(raw: String) -> Result<Self> {
        let hex = normalize_hex(&raw);
        if !AID_RE.is_match(&hex) {
            return Err(TokenbindError::InvalidToken {
                detail: format!("'{raw}' is not a hex application identifier"),
            });
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TokenbindError::InvalidToken {
                detail: format!("bad application identifier '{raw}': {e}"),
            })?;
        Ok(Self(bytes))
    }
}

impl From<Aid> for String {
    fn from(aid: Aid) -> Self {
        aid.to_string()
    }
}

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Describes the physical token whose key is being resolved.
///
/// Built once from the token descriptor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIdentity {
    /// Every fingerprint stored on the token (signature, decryption, auth).
    pub fingerprints: Vec<Fingerprint>,
    /// Public key URL recorded on the token, if any.
    #[serde(default)]
    pub url: Option<String>,
    pub aid: Aid,
    pub fingerprint_sign: Fingerprint,
}

impl TokenIdentity {
    /// Read a token descriptor (JSON) from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TokenbindError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a token descriptor.
    pub fn from_json(content: &str) -> Result<Self> {
        let token: Self =
            serde_json::from_str(content).map_err(|e| TokenbindError::InvalidToken {
                detail: e.to_string(),
            })?;

        if token.fingerprints.is_empty() {
            return Err(TokenbindError::InvalidToken {
                detail: "the token lists no fingerprints".into(),
            });
        }

        Ok(token)
    }
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::errors::{Result, TokenbindError};
use crate::core::models::operation_result::OperationResult;

/// 64-bit identifier of the primary ("master") key that owns the token's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MasterKeyId(pub u64);

impl MasterKeyId {
    /// Parse `0x`-prefixed hex or bare decimal.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            return u64::from_str_radix(hex, 16).ok().map(Self);
        }
        raw.parse().ok().map(Self)
    }
}

impl fmt::Display for MasterKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl Serialize for MasterKeyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{self}"))
    }
}

impl<'de> Deserialize<'de> for MasterKeyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => Self::parse(&s).ok_or_else(|| {
                serde::de::Error::custom(format!("'{s}' is not a valid master key id"))
            }),
        }
    }
}

/// Outcome of one lookup attempt against a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRetrievalResult {
    pub success: bool,
    pub operation: OperationResult,
    /// Raw public key material, present when the key is new to the local store.
    pub key_data: Option<Vec<u8>>,
    pub master_key_id: Option<MasterKeyId>,
}

impl KeyRetrievalResult {
    /// A lookup that found nothing usable.
    pub fn failure(operation: OperationResult) -> Self {
        Self {
            success: false,
            operation,
            key_data: None,
            master_key_id: None,
        }
    }

    /// The key is already in the local store; only its id is known.
    pub fn known(operation: OperationResult, master_key_id: MasterKeyId) -> Self {
        Self {
            success: true,
            operation,
            key_data: None,
            master_key_id: Some(master_key_id),
        }
    }

    /// Fresh key material that still has to be imported.
    pub fn fetched(operation: OperationResult, key_data: Vec<u8>, master_key_id: MasterKeyId) -> Self {
        Self {
            success: true,
            operation,
            key_data: Some(key_data),
            master_key_id: Some(master_key_id),
        }
    }

    /// Decide what a successful result means for the workflow.
    ///
    /// # Errors
    ///
    /// `ContractViolation` when the result is flagged unsuccessful or carries
    /// neither an id nor a usable combination of fields.
    pub fn classify(self) -> Result<Resolution> {
        if !self.success {
            return Err(TokenbindError::contract(
                "classification requested for a failed lookup result",
            ));
        }

        match (self.key_data, self.master_key_id) {
            (Some(key_data), Some(master_key_id)) => Ok(Resolution::Importable {
                key_data,
                master_key_id,
            }),
            (None, Some(master_key_id)) => Ok(Resolution::AlreadyKnown { master_key_id }),
            (Some(_), None) => Err(TokenbindError::contract(
                "successful lookup returned key material without a master key id",
            )),
            (None, None) => Err(TokenbindError::contract(
                "successful lookup returned neither key material nor a master key id",
            )),
        }
    }
}

/// The two legal interpretations of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Key is new locally: offer an import before promoting.
    Importable {
        key_data: Vec<u8>,
        master_key_id: MasterKeyId,
    },
    /// Key is already in the local store: promote straight away.
    AlreadyKnown { master_key_id: MasterKeyId },
}

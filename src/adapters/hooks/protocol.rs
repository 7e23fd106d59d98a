//! JSON messages exchanged with hook commands.
//!
//! A hook reads exactly one request object from stdin and writes exactly one
//! response object to stdout. Key material travels as standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TokenbindError};
use crate::core::models::key_retrieval::{KeyRetrievalResult, MasterKeyId};
use crate::core::models::operation_result::OperationResult;
use crate::core::models::token_identity::Aid;

/// Request sent to the import, promote and reset hooks.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    Import { key_data: String },
    Promote { master_key_id: MasterKeyId, aid: Aid },
    Reset,
}

impl OperationRequest {
    pub fn import(key_data: &[u8]) -> Self {
        Self::Import {
            key_data: STANDARD.encode(key_data),
        }
    }
}

/// What a lookup hook answers.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub key_data: Option<String>,
    #[serde(default)]
    pub master_key_id: Option<MasterKeyId>,
}

/// Decode a lookup hook's stdout.
///
/// The fields are passed through as-is for successful responses; deciding
/// whether the combination makes sense is the workflow's job.
pub fn decode_lookup(hook: &str, stdout: &[u8]) -> Result<KeyRetrievalResult> {
    let response: LookupResponse = parse(hook, stdout)?;
    let operation = OperationResult {
        success: response.success,
        messages: response.messages,
    };

    if !response.success {
        return Ok(KeyRetrievalResult::failure(operation));
    }

    let key_data = response
        .key_data
        .map(|encoded| STANDARD.decode(encoded.trim()))
        .transpose()
        .map_err(|e| TokenbindError::HookProtocol {
            hook: hook.to_string(),
            detail: format!("key_data is not valid base64: {e}"),
        })?;
    if key_data.as_ref().is_some_and(Vec::is_empty) {
        return Err(TokenbindError::HookProtocol {
            hook: hook.to_string(),
            detail: "key_data is empty".to_string(),
        });
    }

    Ok(KeyRetrievalResult {
        success: true,
        operation,
        key_data,
        master_key_id: response.master_key_id,
    })
}

/// Decode an import / promote / reset hook's stdout.
pub fn decode_operation(hook: &str, stdout: &[u8]) -> Result<OperationResult> {
    parse(hook, stdout)
}

fn parse<T: for<'de> Deserialize<'de>>(hook: &str, stdout: &[u8]) -> Result<T> {
    serde_json::from_slice(stdout).map_err(|e| TokenbindError::HookProtocol {
        hook: hook.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fetched_key() {
        let result = decode_lookup(
            "url",
            br#"{"success": true, "messages": ["fetched"], "key_data": "AQID", "master_key_id": "0x10"}"#,
        )
        .unwrap();

        assert!(result.success);
        assert_eq!(result.key_data, Some(vec![1, 2, 3]));
        assert_eq!(result.master_key_id, Some(MasterKeyId(16)));
        assert_eq!(result.operation.summary(), "fetched");
    }

    #[test]
    fn failed_lookup_drops_payload() {
        let result = decode_lookup(
            "keyserver",
            br#"{"success": false, "messages": ["no match"], "key_data": "AQID"}"#,
        )
        .unwrap();

        assert!(!result.success);
        assert!(result.key_data.is_none());
    }

    #[test]
    fn empty_key_data_is_protocol_error() {
        let err = decode_lookup(
            "local",
            br#"{"success": true, "key_data": "", "master_key_id": 7}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TokenbindError::HookProtocol { .. }));
    }

    #[test]
    fn bad_base64_is_protocol_error() {
        let err = decode_lookup("url", br#"{"success": true, "key_data": "***"}"#).unwrap_err();
        assert!(matches!(err, TokenbindError::HookProtocol { .. }));
    }

    #[test]
    fn garbage_is_protocol_error() {
        assert!(decode_operation("import", b"not json").is_err());
    }

    #[test]
    fn promote_request_shape() {
        let request = OperationRequest::Promote {
            master_key_id: MasterKeyId(1),
            aid: Aid::try_from("D276".to_string()).unwrap(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["operation"], "promote");
        assert_eq!(json["master_key_id"], "0x0000000000000001");
        assert_eq!(json["aid"], "D276");
    }

    #[test]
    fn import_request_is_base64() {
        let json = serde_json::to_value(OperationRequest::import(&[1, 2, 3])).unwrap();
        assert_eq!(json["key_data"], "AQID");
    }
}

use crate::core::models::key_retrieval::MasterKeyId;

/// What a run has resolved so far, kept until import, promote or view-key
/// consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOutcome {
    /// Key bytes waiting for the user to accept the import.
    pub pending_import: Option<Vec<u8>>,
    pub master_key_id: Option<MasterKeyId>,
}

use std::path::PathBuf;

use crate::core::models::key_retrieval::KeyRetrievalResult;
use crate::core::models::lookup::{Epoch, LookupTicket};
use crate::core::models::operation_result::OperationResult;

/// Key operations delegated to the crypto collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Import,
    Promote,
    Reset,
}

/// Identifies one dispatched key operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTicket {
    pub kind: OperationKind,
    pub epoch: Epoch,
}

/// Everything that can happen to a running workflow.
///
/// Collaborator completions and user decisions both arrive here and are
/// consumed one at a time by `ResolutionWorkflow::handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    LookupCompleted {
        ticket: LookupTicket,
        result: KeyRetrievalResult,
    },
    OperationCompleted {
        ticket: OperationTicket,
        result: OperationResult,
    },
    FileSelected(PathBuf),
    PermissionResolved {
        granted: bool,
    },
}

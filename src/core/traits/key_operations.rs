use crate::core::models::events::OperationTicket;
use crate::core::models::key_retrieval::MasterKeyId;
use crate::core::models::token_identity::Aid;

/// Port for the cryptographic side: importing, promoting and resetting.
///
/// Every call starts the operation and returns; the outcome comes back as a
/// `WorkflowEvent::OperationCompleted` with the given ticket.
pub trait KeyOperations {
    fn import_key(&mut self, ticket: OperationTicket, key_data: &[u8]);

    /// Bind the key identified by `master_key_id` to the token applet `aid`.
    fn promote_key(&mut self, ticket: OperationTicket, master_key_id: MasterKeyId, aid: &Aid);

    fn reset_token(&mut self, ticket: OperationTicket);
}

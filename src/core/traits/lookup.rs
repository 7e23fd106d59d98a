use crate::core::models::lookup::{LookupRequest, LookupTicket};

/// Port for starting a key lookup.
///
/// Implementations return immediately and later deliver a
/// `WorkflowEvent::LookupCompleted` carrying the same ticket.
pub trait LookupDispatcher {
    fn dispatch(&mut self, ticket: LookupTicket, request: LookupRequest);
}

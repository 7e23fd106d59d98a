pub mod permission_gate;
pub mod resolution_workflow;
pub mod search_coordinator;

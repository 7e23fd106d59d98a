pub mod events;
pub mod key_retrieval;
pub mod lookup;
pub mod operation_result;
pub mod outcome;
pub mod result_log;
pub mod search_state;
pub mod token_identity;
pub mod ui;

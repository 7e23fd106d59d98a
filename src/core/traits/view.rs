use crate::core::models::key_retrieval::MasterKeyId;
use crate::core::models::result_log::LogSnapshot;
use crate::core::models::ui::{Action, StatusLine};

/// Port for whatever renders the workflow to the user.
///
/// Status lines form an ordered list: `status_line_add` opens a line and the
/// next `status_line_ok` / `status_line_error` closes the most recent one.
pub trait WorkflowView {
    fn status_line_add(&mut self, line: StatusLine);

    fn status_line_ok(&mut self);

    fn status_line_error(&mut self);

    /// Drop every status line shown so far.
    fn reset_status_lines(&mut self);

    /// Offer `action`, replacing whatever was offered before.
    fn show_action(&mut self, action: Action);

    fn hide_action(&mut self);

    /// The run is over; show the key that is now bound to the token.
    fn finish_and_show_key(&mut self, master_key_id: MasterKeyId);

    fn show_log(&mut self, log: LogSnapshot);
}

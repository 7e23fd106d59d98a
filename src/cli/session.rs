use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

use crate::adapters::hooks::hook_backend::{HookBackend, HookSet};
use crate::adapters::permissions::dir_permissions::DirPermissions;
use crate::cli::terminal_view::TerminalView;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, TokenbindError};
use crate::core::models::events::{OperationKind, WorkflowEvent};
use crate::core::models::operation_result::OperationResult;
use crate::core::models::token_identity::TokenIdentity;
use crate::core::services::resolution_workflow::ResolutionWorkflow;

pub type TerminalWorkflow = ResolutionWorkflow<TerminalView, HookBackend>;

/// A workflow wired to the hook backend and the terminal, plus the channel
/// its completions come back on.
pub struct Session {
    workflow: TerminalWorkflow,
    events: UnboundedReceiver<WorkflowEvent>,
    reset_result: Option<OperationResult>,
}

impl Session {
    pub fn open(config: &AppConfig, token: TokenIdentity) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let permissions = DirPermissions::new(config.permissions.allowed_dirs.clone());
        debug!(
            allowed_dirs = permissions.allowed_dirs().len(),
            "read permission configured"
        );

        debug!(
            aid = %token.aid,
            fingerprint_sign = token.fingerprint_sign.as_str(),
            "opening session"
        );

        let backend = HookBackend::new(HookSet::from_config(&config.hooks), tx, permissions);
        Self {
            workflow: ResolutionWorkflow::new(token, TerminalView::new(), backend),
            events: rx,
            reset_result: None,
        }
    }

    pub fn workflow(&self) -> &TerminalWorkflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut TerminalWorkflow {
        &mut self.workflow
    }

    /// Feed completions into the workflow until nothing is in flight.
    pub async fn settle(&mut self) -> Result<()> {
        while self.workflow.is_busy() {
            let Some(event) = self.events.recv().await else {
                return Err(TokenbindError::contract(
                    "backend stopped before the pending operation completed",
                ));
            };

            if let WorkflowEvent::OperationCompleted { ticket, result } = &event
                && ticket.kind == OperationKind::Reset
            {
                self.reset_result = Some(result.clone());
            }
            self.workflow.handle(event)?;
        }
        debug!(
            phase = ?self.workflow.phase(),
            epoch = self.workflow.epoch().0,
            chain_exhausted = self.workflow.search_state().all_attempted(),
            "workflow idle"
        );
        Ok(())
    }

    /// The reset hook's answer, once it has come back.
    pub fn take_reset_result(&mut self) -> Option<OperationResult> {
        self.reset_result.take()
    }
}

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::errors::{Result, TokenbindError};
use crate::core::models::events::{OperationKind, OperationTicket, WorkflowEvent};
use crate::core::models::key_retrieval::{KeyRetrievalResult, MasterKeyId, Resolution};
use crate::core::models::lookup::{Epoch, LookupRequest, LookupSource, LookupTicket};
use crate::core::models::operation_result::OperationResult;
use crate::core::models::outcome::WorkflowOutcome;
use crate::core::models::result_log::{LogOrigin, ResultLog};
use crate::core::models::search_state::SearchState;
use crate::core::models::token_identity::TokenIdentity;
use crate::core::models::ui::{Action, StatusLine};
use crate::core::services::permission_gate::PermissionGate;
use crate::core::services::search_coordinator::{SearchAction, SearchCoordinator};
use crate::core::traits::TokenBackend;
use crate::core::traits::view::WorkflowView;

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Searching(LookupSource),
    /// Every chain source came back empty.
    ExhaustedManual,
    /// A new key was found and waits for the user to import it.
    Importable,
    Importing,
    ImportFailed,
    Promoting,
    PromoteFailed,
    Done,
}

/// Resolves the public key of a security token and binds it to the token.
///
/// The workflow never blocks. Every lookup and key operation is handed to
/// the backend together with a ticket, and its completion is fed back
/// through [`ResolutionWorkflow::handle`]. Completions whose ticket no longer
/// matches the one in flight (superseded, or from before a retry) are
/// dropped without touching any state.
pub struct ResolutionWorkflow<V: WorkflowView, B: TokenBackend> {
    token: TokenIdentity,
    view: V,
    backend: B,
    coordinator: SearchCoordinator,
    search: SearchState,
    epoch: Epoch,
    next_sequence: u64,
    lookup_in_flight: Option<LookupTicket>,
    operation_in_flight: Option<OperationTicket>,
    reset_in_flight: Option<OperationTicket>,
    outcome: WorkflowOutcome,
    log: ResultLog,
    gate: PermissionGate,
    phase: Phase,
}

impl<V: WorkflowView, B: TokenBackend> ResolutionWorkflow<V, B> {
    pub fn new(token: TokenIdentity, view: V, backend: B) -> Self {
        Self {
            token,
            view,
            backend,
            coordinator: SearchCoordinator,
            search: SearchState::default(),
            epoch: Epoch::default(),
            next_sequence: 0,
            lookup_in_flight: None,
            operation_in_flight: None,
            reset_in_flight: None,
            outcome: WorkflowOutcome::default(),
            log: ResultLog::new(),
            gate: PermissionGate::default(),
            phase: Phase::Init,
        }
    }

    /// Route one event to the matching transition.
    pub fn handle(&mut self, event: WorkflowEvent) -> Result<()> {
        match event {
            WorkflowEvent::LookupCompleted { ticket, result } => {
                self.on_lookup_completed(ticket, result)
            }
            WorkflowEvent::OperationCompleted { ticket, result } => match ticket.kind {
                OperationKind::Import => self.on_import_completed(ticket, result),
                OperationKind::Promote => {
                    self.on_promote_completed(ticket, result);
                    Ok(())
                }
                OperationKind::Reset => {
                    self.on_reset_completed(ticket, result);
                    Ok(())
                }
            },
            WorkflowEvent::FileSelected(path) => {
                self.on_file_selected(path);
                Ok(())
            }
            WorkflowEvent::PermissionResolved { granted } => {
                self.on_permission_resolved(granted);
                Ok(())
            }
        }
    }

    /// Begin or resume the search. Does nothing while a lookup is in flight.
    pub fn start(&mut self) {
        if let Some(ticket) = self.lookup_in_flight {
            debug!(source = %ticket.source, "start ignored, lookup already in flight");
            return;
        }
        self.continue_search();
    }

    pub fn on_lookup_completed(
        &mut self,
        ticket: LookupTicket,
        result: KeyRetrievalResult,
    ) -> Result<()> {
        if self.lookup_in_flight != Some(ticket) {
            debug!(
                source = %ticket.source,
                epoch = ticket.epoch.0,
                sequence = ticket.sequence,
                "dropping stale lookup completion"
            );
            return Ok(());
        }
        self.lookup_in_flight = None;

        self.search.mark_attempted(ticket.source);
        self.log.append(
            LogOrigin::Lookup(ticket.source),
            &result.operation,
            result.key_data.as_deref(),
        );

        if !result.success {
            warn!(source = %ticket.source, reason = result.operation.summary(), "lookup failed");
            self.view.status_line_error();
            self.continue_search();
            return Ok(());
        }

        info!(source = %ticket.source, "lookup succeeded");
        self.process_result(result)
    }

    /// Forget all progress and search again from the first source.
    pub fn on_retry(&mut self) {
        self.search.reset();
        self.epoch = self.epoch.next();
        self.lookup_in_flight = None;
        self.operation_in_flight = None;
        self.outcome = WorkflowOutcome::default();
        info!(epoch = self.epoch.0, "search restarted");

        self.view.hide_action();
        self.view.reset_status_lines();
        self.start();
    }

    /// Import the key bytes retained by the last successful lookup.
    ///
    /// # Errors
    ///
    /// `ContractViolation` if no import payload is retained; the view only
    /// offers the import action when one is.
    pub fn on_click_import(&mut self) -> Result<()> {
        let Some(key_data) = self.outcome.pending_import.clone() else {
            return Err(TokenbindError::contract(
                "import requested but no key material was retrieved",
            ));
        };
        if let Some(ticket) = self.operation_in_flight {
            debug!(kind = ?ticket.kind, "import ignored, operation already in flight");
            return Ok(());
        }

        self.view.status_line_add(StatusLine::Import);
        self.view.hide_action();
        self.phase = Phase::Importing;
        let ticket = self.begin_operation(OperationKind::Import);
        self.backend.import_key(ticket, &key_data);
        Ok(())
    }

    pub fn on_import_completed(
        &mut self,
        ticket: OperationTicket,
        result: OperationResult,
    ) -> Result<()> {
        if !self.accept_operation(ticket) {
            return Ok(());
        }
        self.log.append(LogOrigin::Import, &result, None);

        if !result.success {
            warn!(reason = result.summary(), "import failed");
            self.view.status_line_error();
            self.phase = Phase::ImportFailed;
            self.view.show_action(Action::ShowImport);
            return Ok(());
        }

        let master_key_id = self.outcome.master_key_id.ok_or_else(|| {
            TokenbindError::contract("import finished but no master key id was retained")
        })?;
        self.outcome.pending_import = None;

        self.view.status_line_ok();
        self.view.status_line_add(StatusLine::TokenPromote);
        self.promote(master_key_id);
        Ok(())
    }

    pub fn on_promote_completed(&mut self, ticket: OperationTicket, result: OperationResult) {
        if !self.accept_operation(ticket) {
            return;
        }
        self.log.append(LogOrigin::Promote, &result, None);

        if result.success {
            info!("key bound to token");
            self.view.status_line_ok();
            self.phase = Phase::Done;
            self.view.show_action(Action::ShowViewKey);
        } else {
            warn!(reason = result.summary(), "promotion failed");
            self.view.status_line_error();
            self.phase = Phase::PromoteFailed;
            self.view.show_action(Action::ShowRetryOrFile);
        }
    }

    /// # Errors
    ///
    /// `ContractViolation` if no key has been resolved yet.
    pub fn on_click_view_key(&mut self) -> Result<()> {
        let master_key_id = self.outcome.master_key_id.ok_or_else(|| {
            TokenbindError::contract("view key requested before a key was resolved")
        })?;
        self.view.finish_and_show_key(master_key_id);
        Ok(())
    }

    pub fn on_click_view_log(&mut self) {
        self.view.show_log(self.log.snapshot());
    }

    pub fn on_click_reset(&mut self) {
        self.view.show_action(Action::ShowConfirmReset);
    }

    /// The user confirmed: wipe the token. Search progress is left alone.
    pub fn on_confirm_reset(&mut self) {
        self.view.hide_action();
        let ticket = self.begin_operation(OperationKind::Reset);
        self.backend.reset_token(ticket);
    }

    pub fn on_reset_completed(&mut self, ticket: OperationTicket, result: OperationResult) {
        if !self.accept_operation(ticket) {
            return;
        }
        if result.success {
            info!("token reset");
        } else {
            warn!(reason = result.summary(), "token reset failed");
        }
    }

    pub fn on_click_load_file(&mut self) {
        self.view.show_action(Action::ShowFileDialog);
    }

    /// Look the key up in a user-picked file, asking for read access first
    /// when it is missing.
    pub fn on_file_selected(&mut self, file: PathBuf) {
        if self.backend.check_read_permission(&file) {
            self.start_loading_file(file);
            return;
        }

        debug!(file = %file.display(), "read permission missing, suspending file lookup");
        self.backend.request_permission(&file);
        self.gate.suspend(file);
        self.view.show_action(Action::RequestPermission);
    }

    pub fn on_permission_resolved(&mut self, granted: bool) {
        if self.gate.pending().is_none() {
            debug!(granted, "permission decision with no pending file");
            return;
        }
        self.view.hide_action();

        match self.gate.resolve(granted) {
            Some(file) => self.start_loading_file(file),
            None => debug!("read permission denied, file selection dropped"),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn outcome(&self) -> &WorkflowOutcome {
        &self.outcome
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    pub fn pending_file(&self) -> Option<&Path> {
        self.gate.pending()
    }

    /// True while a lookup, key operation or reset has not reported back.
    pub fn is_busy(&self) -> bool {
        self.lookup_in_flight.is_some()
            || self.operation_in_flight.is_some()
            || self.reset_in_flight.is_some()
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn continue_search(&mut self) {
        match self.coordinator.advance(&self.search, &self.token) {
            SearchAction::RunLookup(request) => {
                self.view
                    .status_line_add(StatusLine::searching(request.source()));
                self.dispatch_lookup(request);
            }
            SearchAction::Exhausted => {
                info!("all lookup sources exhausted");
                self.phase = Phase::ExhaustedManual;
                self.view.show_action(Action::ShowRetryOrFile);
            }
        }
    }

    fn start_loading_file(&mut self, file: PathBuf) {
        self.view.hide_action();
        self.view.reset_status_lines();
        self.view.status_line_add(StatusLine::SearchContentFile);
        let request = LookupRequest::content_file(&self.token, file);
        self.dispatch_lookup(request);
    }

    fn dispatch_lookup(&mut self, request: LookupRequest) {
        let ticket = LookupTicket {
            source: request.source(),
            epoch: self.epoch,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        if let Some(previous) = self.lookup_in_flight.replace(ticket) {
            debug!(source = %previous.source, "in-flight lookup superseded");
        }
        self.phase = Phase::Searching(ticket.source);
        debug!(source = %ticket.source, epoch = ticket.epoch.0, "dispatching lookup");
        self.backend.dispatch(ticket, request);
    }

    fn process_result(&mut self, result: KeyRetrievalResult) -> Result<()> {
        match result.classify()? {
            Resolution::Importable {
                key_data,
                master_key_id,
            } => {
                self.view.status_line_ok();
                self.outcome.pending_import = Some(key_data);
                self.outcome.master_key_id = Some(master_key_id);
                self.phase = Phase::Importable;
                self.view.show_action(Action::ShowImport);
            }
            Resolution::AlreadyKnown { master_key_id } => {
                self.view.status_line_ok();
                self.outcome.master_key_id = Some(master_key_id);
                self.view.status_line_add(StatusLine::TokenCheck);
                self.promote(master_key_id);
            }
        }
        Ok(())
    }

    fn promote(&mut self, master_key_id: MasterKeyId) {
        self.phase = Phase::Promoting;
        let ticket = self.begin_operation(OperationKind::Promote);
        self.backend
            .promote_key(ticket, master_key_id, &self.token.aid);
    }

    /// Resets run beside import and promote, so they hold their own slot.
    fn slot(&mut self, kind: OperationKind) -> &mut Option<OperationTicket> {
        match kind {
            OperationKind::Reset => &mut self.reset_in_flight,
            OperationKind::Import | OperationKind::Promote => &mut self.operation_in_flight,
        }
    }

    fn begin_operation(&mut self, kind: OperationKind) -> OperationTicket {
        let ticket = OperationTicket {
            kind,
            epoch: self.epoch,
        };
        if let Some(previous) = self.slot(kind).replace(ticket) {
            debug!(kind = ?previous.kind, "in-flight operation superseded");
        }
        ticket
    }

    fn accept_operation(&mut self, ticket: OperationTicket) -> bool {
        let slot = self.slot(ticket.kind);
        if *slot != Some(ticket) {
            debug!(kind = ?ticket.kind, epoch = ticket.epoch.0, "dropping stale operation completion");
            return false;
        }
        *slot = None;
        true
    }
}

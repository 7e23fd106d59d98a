use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::adapters::hooks::protocol::{self, OperationRequest};
use crate::adapters::hooks::runner::HookCommand;
use crate::adapters::permissions::dir_permissions::DirPermissions;
use crate::config::app_config::HooksSection;
use crate::core::errors::{Result, TokenbindError};
use crate::core::models::events::{OperationKind, OperationTicket, WorkflowEvent};
use crate::core::models::key_retrieval::{KeyRetrievalResult, MasterKeyId};
use crate::core::models::lookup::{LookupRequest, LookupSource, LookupTicket};
use crate::core::models::operation_result::OperationResult;
use crate::core::models::token_identity::Aid;
use crate::core::traits::key_operations::KeyOperations;
use crate::core::traits::lookup::LookupDispatcher;
use crate::core::traits::permission::PermissionProvider;

/// The configured hook for every collaborator, if any.
#[derive(Debug, Default)]
pub struct HookSet {
    local: Option<HookCommand>,
    url: Option<HookCommand>,
    keyserver: Option<HookCommand>,
    content_file: Option<HookCommand>,
    import: Option<HookCommand>,
    promote: Option<HookCommand>,
    reset: Option<HookCommand>,
}

impl HookSet {
    pub fn from_config(section: &HooksSection) -> Self {
        let timeout = Duration::from_secs(section.timeout_secs);
        let hook = |name: &str, argv: &Option<Vec<String>>| {
            argv.as_deref()
                .and_then(|argv| HookCommand::from_argv(name, argv, timeout))
        };

        Self {
            local: hook("local", &section.local),
            url: hook("url", &section.url),
            keyserver: hook("keyserver", &section.keyserver),
            content_file: hook("content_file", &section.content_file),
            import: hook("import", &section.import),
            promote: hook("promote", &section.promote),
            reset: hook("reset", &section.reset),
        }
    }

    fn for_source(&self, source: LookupSource) -> Option<&HookCommand> {
        match source {
            LookupSource::LocalStore => self.local.as_ref(),
            LookupSource::UrlFetch => self.url.as_ref(),
            LookupSource::Keyserver => self.keyserver.as_ref(),
            LookupSource::ContentFile => self.content_file.as_ref(),
        }
    }

    fn for_operation(&self, kind: OperationKind) -> Option<&HookCommand> {
        match kind {
            OperationKind::Import => self.import.as_ref(),
            OperationKind::Promote => self.promote.as_ref(),
            OperationKind::Reset => self.reset.as_ref(),
        }
    }
}

/// Backend that runs every collaborator as a hook command on the tokio
/// runtime and posts completions to the workflow's event channel.
///
/// Must be used from within a tokio runtime.
pub struct HookBackend {
    hooks: Arc<HookSet>,
    events: UnboundedSender<WorkflowEvent>,
    permissions: DirPermissions,
}

impl HookBackend {
    pub fn new(
        hooks: HookSet,
        events: UnboundedSender<WorkflowEvent>,
        permissions: DirPermissions,
    ) -> Self {
        Self {
            hooks: Arc::new(hooks),
            events,
            permissions,
        }
    }

    fn spawn_operation(&self, ticket: OperationTicket, request: OperationRequest) {
        let hooks = Arc::clone(&self.hooks);
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = run_operation(hooks.for_operation(ticket.kind), request).await;
            if events
                .send(WorkflowEvent::OperationCompleted { ticket, result })
                .is_err()
            {
                debug!(kind = ?ticket.kind, "workflow gone, operation result dropped");
            }
        });
    }
}

impl LookupDispatcher for HookBackend {
    fn dispatch(&mut self, ticket: LookupTicket, request: LookupRequest) {
        let hooks = Arc::clone(&self.hooks);
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = run_lookup(hooks.for_source(ticket.source), &request).await;
            if events
                .send(WorkflowEvent::LookupCompleted { ticket, result })
                .is_err()
            {
                debug!(source = %ticket.source, "workflow gone, lookup result dropped");
            }
        });
    }
}

impl KeyOperations for HookBackend {
    fn import_key(&mut self, ticket: OperationTicket, key_data: &[u8]) {
        self.spawn_operation(ticket, OperationRequest::import(key_data));
    }

    fn promote_key(&mut self, ticket: OperationTicket, master_key_id: MasterKeyId, aid: &Aid) {
        let request = OperationRequest::Promote {
            master_key_id,
            aid: aid.clone(),
        };
        self.spawn_operation(ticket, request);
    }

    fn reset_token(&mut self, ticket: OperationTicket) {
        self.spawn_operation(ticket, OperationRequest::Reset);
    }
}

impl PermissionProvider for HookBackend {
    fn check_read_permission(&self, path: &Path) -> bool {
        self.permissions.check_read_permission(path)
    }

    fn request_permission(&mut self, path: &Path) {
        self.permissions.request_permission(path);
    }
}

/// Run a lookup hook. Every failure along the way, including a missing hook,
/// becomes a failed lookup so the fallback chain can move on.
async fn run_lookup(hook: Option<&HookCommand>, request: &LookupRequest) -> KeyRetrievalResult {
    let source = request.source();
    let Some(hook) = hook else {
        return KeyRetrievalResult::failure(OperationResult::failed(format!(
            "No hook configured for {source} lookups"
        )));
    };

    let outcome: Result<KeyRetrievalResult> = async {
        let body = serde_json::to_vec(request).map_err(|e| TokenbindError::HookProtocol {
            hook: hook.name().to_string(),
            detail: format!("cannot encode request: {e}"),
        })?;
        let stdout = hook.run(&body).await?;
        protocol::decode_lookup(hook.name(), &stdout)
    }
    .await;

    outcome.unwrap_or_else(|e| {
        warn!(source = %source, error = %e, "lookup hook failed");
        KeyRetrievalResult::failure(OperationResult::failed(e.to_string()))
    })
}

async fn run_operation(hook: Option<&HookCommand>, request: OperationRequest) -> OperationResult {
    let Some(hook) = hook else {
        return OperationResult::failed(format!(
            "No hook configured for {}",
            operation_name(&request)
        ));
    };

    let outcome: Result<OperationResult> = async {
        let body = serde_json::to_vec(&request).map_err(|e| TokenbindError::HookProtocol {
            hook: hook.name().to_string(),
            detail: format!("cannot encode request: {e}"),
        })?;
        let stdout = hook.run(&body).await?;
        protocol::decode_operation(hook.name(), &stdout)
    }
    .await;

    outcome.unwrap_or_else(|e| {
        warn!(hook = hook.name(), error = %e, "operation hook failed");
        OperationResult::failed(e.to_string())
    })
}

fn operation_name(request: &OperationRequest) -> &'static str {
    match request {
        OperationRequest::Import { .. } => "key import",
        OperationRequest::Promote { .. } => "key promotion",
        OperationRequest::Reset => "token reset",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::lookup::Epoch;
    use crate::core::models::token_identity::Fingerprint;
    use tokio::sync::mpsc;

    fn sh(script: &str) -> Option<Vec<String>> {
        Some(vec!["sh".into(), "-c".into(), script.into()])
    }

    fn backend(section: HooksSection) -> (HookBackend, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = HookBackend::new(
            HookSet::from_config(&section),
            tx,
            DirPermissions::new(Vec::new()),
        );
        (backend, rx)
    }

    fn keyserver_request() -> LookupRequest {
        LookupRequest::Keyserver {
            fingerprint_sign: Fingerprint::try_from(
                "4F2A9C3D8E1B7A6F5C4D3E2F1A0B9C8D7E6F5A4B".to_string(),
            )
            .unwrap(),
        }
    }

    fn ticket(source: LookupSource) -> LookupTicket {
        LookupTicket {
            source,
            epoch: Epoch(0),
            sequence: 0,
        }
    }

    #[tokio::test]
    async fn lookup_completion_is_posted_with_ticket() {
        let (mut backend, mut rx) = backend(HooksSection {
            keyserver: sh(
                r#"cat >/dev/null; echo '{"success": true, "master_key_id": 42, "messages": ["hit"]}'"#,
            ),
            ..HooksSection::default()
        });

        backend.dispatch(ticket(LookupSource::Keyserver), keyserver_request());

        let Some(WorkflowEvent::LookupCompleted { ticket: got, result }) = rx.recv().await else {
            panic!("expected a lookup completion");
        };
        assert_eq!(got, ticket(LookupSource::Keyserver));
        assert!(result.success);
        assert_eq!(result.master_key_id, Some(MasterKeyId(42)));
    }

    #[tokio::test]
    async fn hook_receives_request_json() {
        let (mut backend, mut rx) = backend(HooksSection {
            keyserver: sh(
                r#"grep -q '"source":"keyserver"' && echo '{"success": true, "master_key_id": 1}' || echo '{"success": false}'"#,
            ),
            ..HooksSection::default()
        });

        backend.dispatch(ticket(LookupSource::Keyserver), keyserver_request());

        let Some(WorkflowEvent::LookupCompleted { result, .. }) = rx.recv().await else {
            panic!("expected a lookup completion");
        };
        assert!(result.success);
    }

    #[tokio::test]
    async fn missing_hook_is_a_failed_lookup() {
        let (mut backend, mut rx) = backend(HooksSection::default());

        backend.dispatch(ticket(LookupSource::Keyserver), keyserver_request());

        let Some(WorkflowEvent::LookupCompleted { result, .. }) = rx.recv().await else {
            panic!("expected a lookup completion");
        };
        assert!(!result.success);
        assert!(result.operation.summary().contains("No hook configured"));
    }

    #[tokio::test]
    async fn crashing_hook_is_a_failed_operation() {
        let (mut backend, mut rx) = backend(HooksSection {
            import: sh("cat >/dev/null; echo 'keyring locked' >&2; exit 1"),
            ..HooksSection::default()
        });
        let ticket = OperationTicket {
            kind: OperationKind::Import,
            epoch: Epoch(0),
        };

        backend.import_key(ticket, b"key");

        let Some(WorkflowEvent::OperationCompleted { result, .. }) = rx.recv().await else {
            panic!("expected an operation completion");
        };
        assert!(!result.success);
        assert!(result.summary().contains("keyring locked"));
    }
}

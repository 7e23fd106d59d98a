use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapters::log_export::json_log_exporter::JsonLogExporter;
use crate::cli::session::Session;
use crate::cli::{context, output, prompt};
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, TokenbindError};
use crate::core::models::events::WorkflowEvent;
use crate::core::models::token_identity::TokenIdentity;
use crate::core::models::ui::Action;
use crate::core::services::resolution_workflow::Phase;

/// Options of `tokenbind resolve`.
pub struct ResolveOptions<'a> {
    pub token: &'a Path,
    pub file: Option<&'a Path>,
    pub yes: bool,
    pub show_log: bool,
    pub export_log: Option<&'a Path>,
}

/// What the user picked when every source came back empty.
enum NextStep {
    Retry,
    LoadFile,
    ViewLog,
    Quit,
}

/// Execute the `tokenbind resolve` command.
///
/// Walks the lookup chain (or reads `--file`), imports the key if it is new,
/// binds it to the token and shows the resulting master key ID.
pub fn execute(opts: &ResolveOptions<'_>) -> Result<()> {
    let config = AppConfig::load(&context::config_path())?;
    let token = TokenIdentity::load(opts.token)?;

    output::header(&format!("tokenbind: resolving key for token {}", token.aid));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(&config, token, opts))
}

async fn run(config: &AppConfig, token: TokenIdentity, opts: &ResolveOptions<'_>) -> Result<()> {
    let mut session = Session::open(config, token);

    match opts.file {
        Some(file) => session
            .workflow_mut()
            .handle(WorkflowEvent::FileSelected(file.to_path_buf()))?,
        None => session.workflow_mut().start(),
    }

    let driven = drive(&mut session, opts.yes).await;

    if opts.show_log {
        session.workflow_mut().on_click_view_log();
    }
    if let Some(path) = opts.export_log {
        let log = session.workflow().log();
        let exporter = JsonLogExporter::new(path);
        exporter.export(&log.snapshot())?;
        output::success(&format!(
            "Result log ({} entries) written to {}",
            log.len(),
            exporter.path().display()
        ));
    }

    driven?;
    if session.workflow().phase() != Phase::Done {
        return Err(TokenbindError::NotResolved);
    }
    Ok(())
}

/// Answer whatever the workflow offers until it offers nothing more.
async fn drive(session: &mut Session, yes: bool) -> Result<()> {
    let mut auto_imported = false;

    loop {
        session.settle().await?;

        let Some(action) = session.workflow_mut().view_mut().take_action() else {
            return Ok(());
        };
        debug!(?action, "offered");

        match action {
            Action::ShowImport => {
                if let Some(id) = session.workflow().outcome().master_key_id {
                    output::info(&format!("Found key 0x{id}"));
                }
                // --yes imports once; a failed import is not retried blindly.
                let import = if yes {
                    !std::mem::replace(&mut auto_imported, true)
                } else {
                    prompt::confirm("Import it into the local key store?", true)?
                };
                if !import {
                    output::warning("Import skipped");
                    return Ok(());
                }
                session.workflow_mut().on_click_import()?;
            }
            Action::ShowRetryOrFile => loop {
                let reason = match session.workflow().phase() {
                    Phase::PromoteFailed => "The key could not be bound to the token",
                    _ => "No source had a usable key",
                };
                match next_step(reason, yes)? {
                    NextStep::Retry => {
                        session.workflow_mut().on_retry();
                        break;
                    }
                    NextStep::LoadFile => {
                        session.workflow_mut().on_click_load_file();
                        break;
                    }
                    NextStep::ViewLog => session.workflow_mut().on_click_view_log(),
                    NextStep::Quit => return Ok(()),
                }
            },
            Action::ShowFileDialog => match prompt::ask("Path to the public key file")? {
                Some(path) if !path.is_empty() => session
                    .workflow_mut()
                    .handle(WorkflowEvent::FileSelected(PathBuf::from(path)))?,
                _ => {
                    output::warning("No file selected");
                    return Ok(());
                }
            },
            Action::RequestPermission => {
                let file = session
                    .workflow()
                    .pending_file()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let granted =
                    yes || prompt::confirm(&format!("Allow tokenbind to read {file}?"), false)?;
                if !granted {
                    output::warning("Read permission denied");
                }
                session
                    .workflow_mut()
                    .handle(WorkflowEvent::PermissionResolved { granted })?;
            }
            Action::ShowViewKey => {
                session.workflow_mut().on_click_view_key()?;
                return Ok(());
            }
            Action::ShowConfirmReset => {
                debug!("reset offered during resolve, ignored");
                return Ok(());
            }
        }
    }
}

fn next_step(reason: &str, yes: bool) -> Result<NextStep> {
    output::warning(reason);
    if yes {
        return Ok(NextStep::Quit);
    }

    let Some(answer) = prompt::ask("[r]etry, load from [f]ile, view [l]og, [q]uit")? else {
        return Ok(NextStep::Quit);
    };
    Ok(match answer.to_lowercase().as_str() {
        "r" | "retry" => NextStep::Retry,
        "f" | "file" => NextStep::LoadFile,
        "l" | "log" => NextStep::ViewLog,
        _ => NextStep::Quit,
    })
}

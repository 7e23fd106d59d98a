use std::path::Path;

use crate::cli::session::Session;
use crate::cli::{context, output, prompt};
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, TokenbindError};
use crate::core::models::token_identity::TokenIdentity;
use crate::core::models::ui::Action;

/// Execute the `tokenbind reset` command.
///
/// Asks for confirmation (unless `--yes`) and runs the reset hook.
pub fn execute(token_path: &Path, yes: bool) -> Result<()> {
    let config = AppConfig::load(&context::config_path())?;
    let token = TokenIdentity::load(token_path)?;

    output::header(&format!("tokenbind: reset token {}", token.aid));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(&config, token, yes))
}

async fn run(config: &AppConfig, token: TokenIdentity, yes: bool) -> Result<()> {
    let mut session = Session::open(config, token);

    session.workflow_mut().on_click_reset();
    if session.workflow_mut().view_mut().take_action() != Some(Action::ShowConfirmReset) {
        return Err(TokenbindError::contract("reset was not offered for confirmation"));
    }

    output::warning("This erases every key and PIN in the token's OpenPGP applet.");
    if !(yes || prompt::confirm("Reset the token?", false)?) {
        output::warning("Reset cancelled");
        return Ok(());
    }

    session.workflow_mut().on_confirm_reset();
    session.settle().await?;

    match session.take_reset_result() {
        Some(result) if result.success => {
            output::success("Token reset");
            Ok(())
        }
        Some(result) => Err(TokenbindError::ResetFailed {
            reason: result.summary().to_string(),
        }),
        None => Err(TokenbindError::contract("reset finished without a result")),
    }
}

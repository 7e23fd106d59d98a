use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::errors::{Result, TokenbindError};

/// An external program that implements one collaborator.
///
/// The request is written to the hook's stdin, the response is read from its
/// stdout. A non-zero exit status counts as failure and carries stderr.
#[derive(Debug, Clone)]
pub struct HookCommand {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl HookCommand {
    /// Build a hook from a configured argv. Returns `None` for an empty argv.
    pub fn from_argv(name: &str, argv: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            name: name.to_string(),
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the hook with `request` on stdin and return its stdout.
    pub async fn run(&self, request: &[u8]) -> Result<Vec<u8>> {
        tracing::debug!(hook = %self.name, program = %self.program, "spawning hook");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.failed(format!("failed to start '{}': {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(request).await
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(self.failed(format!("failed to write request: {e}")));
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| self.failed(format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| self.failed(format!("process failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        Ok(output.stdout)
    }

    fn failed(&self, reason: String) -> TokenbindError {
        TokenbindError::HookFailed {
            hook: self.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> HookCommand {
        HookCommand::from_argv(
            "test",
            &["sh".to_string(), "-c".to_string(), script.to_string()],
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn empty_argv_is_no_hook() {
        assert!(HookCommand::from_argv("x", &[], Duration::from_secs(1)).is_none());
    }

    #[tokio::test]
    async fn echoes_stdin_back() {
        let out = sh("cat").run(b"{\"a\":1}").await.unwrap();
        assert_eq!(out, b"{\"a\":1}");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let err = sh("echo boom >&2; exit 3").run(b"").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn hook_ignoring_stdin_still_works() {
        let out = sh("echo done").run(&[b'x'; 128]).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&out).trim(), "done");
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let hook = HookCommand::from_argv(
            "missing",
            &["/nonexistent/tokenbind-hook".to_string()],
            Duration::from_secs(1),
        )
        .unwrap();
        let err = hook.run(b"").await.unwrap_err();
        assert!(matches!(err, TokenbindError::HookFailed { .. }));
    }

    #[tokio::test]
    async fn slow_hook_times_out() {
        let mut hook = sh("sleep 5");
        hook.timeout = Duration::from_millis(100);
        let err = hook.run(b"").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output;
use crate::core::models::key_retrieval::MasterKeyId;
use crate::core::models::result_log::{LogEntry, LogOrigin, LogSnapshot};
use crate::core::models::ui::{Action, StatusLine};
use crate::core::traits::view::WorkflowView;

/// Renders the workflow on the terminal.
///
/// The open status line is a spinner; closing it prints a ✓ or ✗ row. The
/// offered action is only recorded here, the command driving the session
/// picks it up with [`TerminalView::take_action`] and prompts for it.
#[derive(Default)]
pub struct TerminalView {
    open: Option<(StatusLine, ProgressBar)>,
    action: Option<Action>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the currently offered action, leaving none offered.
    pub fn take_action(&mut self) -> Option<Action> {
        self.action.take()
    }

    fn close(&mut self) -> Option<StatusLine> {
        let (line, spinner) = self.open.take()?;
        spinner.finish_and_clear();
        Some(line)
    }
}

impl WorkflowView for TerminalView {
    fn status_line_add(&mut self, line: StatusLine) {
        // A line left open is superseded; it never got a verdict.
        if let Some(previous) = self.close() {
            output::info(&format!("{} (interrupted)", previous.label()));
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(line.label());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.open = Some((line, spinner));
    }

    fn status_line_ok(&mut self) {
        if let Some(line) = self.close() {
            output::success(line.label());
        }
    }

    fn status_line_error(&mut self) {
        if let Some(line) = self.close() {
            output::failure(line.label());
        }
    }

    fn reset_status_lines(&mut self) {
        self.close();
        output::header("Searching again");
    }

    fn show_action(&mut self, action: Action) {
        self.action = Some(action);
    }

    fn hide_action(&mut self) {
        self.action = None;
    }

    fn finish_and_show_key(&mut self, master_key_id: MasterKeyId) {
        self.close();
        output::header("Key bound to token");
        println!("  Master key ID: {}", format!("0x{master_key_id}").bold());
    }

    fn show_log(&mut self, log: LogSnapshot) {
        output::header(&format!("Result log ({} entries)", log.entries().len()));
        if log.entries().is_empty() {
            output::warning("Nothing has run yet");
            return;
        }
        println!();
        for entry in log.entries() {
            print_entry(entry);
        }
        if log.is_clean() {
            println!();
            output::success("Every operation succeeded");
        }
    }
}

/// Print one log entry as a row.
fn print_entry(entry: &LogEntry) {
    let time = entry.timestamp.format("%H:%M:%S");
    let verdict = if entry.success {
        "ok".green()
    } else {
        "failed".red()
    };
    let detail = entry.messages.join("; ");

    println!(
        "  {} {} {:<22} {:<6} {}",
        time.to_string().dimmed(),
        "│".dimmed(),
        format_origin(entry.origin),
        verdict,
        detail.dimmed(),
    );
    if let Some(digest) = &entry.key_digest {
        println!("  {:>8} {} key sha256 {}", "", "│".dimmed(), digest.dimmed());
    }
}

fn format_origin(origin: LogOrigin) -> String {
    match origin {
        LogOrigin::Lookup(source) => format!("lookup {source}").cyan().to_string(),
        LogOrigin::Import => "import".blue().to_string(),
        LogOrigin::Promote => "promote".magenta().to_string(),
    }
}

mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::commands::resolve::ResolveOptions;
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();

    init_tracing(args.verbose);
    cli::context::init(args.config.as_deref());

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(args.verbose),
        Commands::Resolve {
            token,
            file,
            yes,
            show_log,
            export_log,
        } => cli::commands::resolve::execute(&ResolveOptions {
            token,
            file: file.as_deref(),
            yes: *yes,
            show_log: *show_log,
            export_log: export_log.as_deref(),
        }),
        Commands::Reset { token, yes } => cli::commands::reset::execute(token, *yes),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr. `TOKENBIND_LOG` takes a tracing filter;
/// `--verbose` forces debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TOKENBIND_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

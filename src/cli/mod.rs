pub mod commands;
pub mod context;
pub mod output;
pub mod prompt;
pub mod session;
pub mod terminal_view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Find the public key of a security token and bind it to the token.
#[derive(Parser, Debug)]
#[command(name = "tokenbind", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (same as TOKENBIND_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to alternative config file
    #[arg(long, global = true, env = "TOKENBIND_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .tokenbind/config.toml with hook placeholders
    Init,

    /// Look up the token's public key, import it and bind it to the token
    Resolve {
        /// Token descriptor (JSON with fingerprints, aid, fingerprint_sign, url)
        #[arg(long)]
        token: PathBuf,

        /// Read the key from this file instead of searching the lookup chain
        #[arg(long)]
        file: Option<PathBuf>,

        /// Answer yes to every prompt (import, read permission)
        #[arg(short, long)]
        yes: bool,

        /// Print the result log when the run ends
        #[arg(long)]
        show_log: bool,

        /// Write the result log as JSON lines to this path
        #[arg(long, value_name = "PATH")]
        export_log: Option<PathBuf>,
    },

    /// Wipe the OpenPGP applet of the token
    Reset {
        /// Token descriptor (JSON with fingerprints, aid, fingerprint_sign, url)
        #[arg(long)]
        token: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

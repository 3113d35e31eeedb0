// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! quire_cli - the `quire` command-line front end.
//!
//! Notes live in `.quire/notes/` next to a client manifest; `quire sync`
//! exchanges them with a shared store through [`quire_sync`].
//!
//! # Main Components
//!
//! - [`Cli`] - clap definition of the command line
//! - [`Config`] - Replica configuration (`.quire/config.toml`)
//! - [`Error`] - Error types with user-facing hints

mod cli;
pub mod colors;
mod commands;
pub mod config;
pub mod error;
pub mod help;
mod identity;
mod prompt;

pub use cli::{Cli, Command, ConfigCommand, ConflictPolicy, OutputFormat};
pub use config::{find_work_dir, init_work_dir, Config};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "QUIRE_LOG";

/// Installs the stderr log subscriber.
///
/// `QUIRE_LOG` takes an `EnvFilter` directive; without it the level is
/// `warn`, or `debug` for quire's own crates when `verbose` is set.
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if verbose { "warn,quire=debug,quire_cli=debug,quire_core=debug,quire_sync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { store, client_id } => commands::init::run(store, client_id),
        Command::New { title, text } => commands::note::run_new(&title, &text),
        Command::Edit { note, text } => commands::note::run_edit(&note, &text),
        Command::Rename { note, title, update_links } => commands::note::run_rename(&note, &title, update_links),
        Command::Delete { note } => commands::note::run_delete(&note),
        Command::List { output } => commands::list::run(output),
        Command::Show { note, output } => commands::show::run(&note, output),
        Command::Sync { on_conflict } => commands::sync::run(on_conflict),
        Command::Status => commands::status::run(),
        Command::Config(cmd) => commands::config::run(cmd),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "quire", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use quire_core::LockObservation;

use super::{open_replica, Replica};
use crate::cli::ConfigCommand;
use crate::commands::init::absolute;
use crate::commands::sync::save_lock_observation;
use crate::error::Result;

/// Execute a config subcommand.
pub fn run(cmd: ConfigCommand) -> Result<()> {
    let mut replica = open_replica()?;
    match cmd {
        ConfigCommand::Store { path } => {
            let cwd = std::env::current_dir()?;
            set_store(&mut replica, &cwd, &path)?;
            let store = replica.config.store_path(&replica.work_dir).unwrap_or_default();
            println!("Store set to {}", store.display());
            println!("Sync history cleared; the next sync starts from scratch.");
            Ok(())
        }
        ConfigCommand::Show => {
            println!("{}", describe(&replica));
            Ok(())
        }
    }
}

/// Points the replica at `path` and forgets what it synced with the old
/// store.
pub(crate) fn set_store(replica: &mut Replica, cwd: &Path, path: &str) -> Result<()> {
    replica.config.set_store_path(absolute(cwd, path));
    replica.config.save(&replica.work_dir)?;
    replica.client()?.reset()?;
    save_lock_observation(&replica.work_dir, &LockObservation::new())?;
    tracing::info!(store = %path, "sync store changed");
    Ok(())
}

pub(crate) fn describe(replica: &Replica) -> String {
    let config = &replica.config;
    let store = config
        .store_path(&replica.work_dir)
        .map_or_else(|| "(not configured)".to_string(), |p| p.display().to_string());
    format!(
        "client_id: {}\nstore: {}\nlock_duration: {}s\nnotes: {}",
        config.client_id(),
        store,
        config.lock_duration().as_secs(),
        replica.notes.dir().display(),
    )
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

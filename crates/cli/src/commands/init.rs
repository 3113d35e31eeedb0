// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use crate::config::{init_work_dir, Config};
use crate::error::Result;

pub fn run(store: Option<String>, client_id: Option<String>) -> Result<()> {
    let root = std::env::current_dir()?;
    let work_dir = run_impl(&root, store, client_id)?;
    let config = Config::load(&work_dir)?;

    println!("Initialized quire replica at {}", work_dir.display());
    println!("Client: {}", config.client_id());
    match config.store_path(&work_dir) {
        Some(store) => {
            println!("Store: {}", store.display());
            if !store.is_dir() {
                eprintln!("Warning: store {} does not exist yet", store.display());
            }
        }
        None => println!("Store: not configured (set one with `quire config store <path>`)"),
    }
    Ok(())
}

/// Creates the replica under `root` and returns its `.quire/` directory.
pub(crate) fn run_impl(root: &Path, store: Option<String>, client_id: Option<String>) -> Result<PathBuf> {
    let mut config = Config { client_id, sync: None };
    if let Some(store) = store {
        config.set_store_path(absolute(root, &store));
    }
    init_work_dir(root, &config)
}

/// Anchors a user-supplied path at `base` so the config does not depend on
/// the directory the command ran from.
pub(crate) fn absolute(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;

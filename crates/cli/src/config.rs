// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replica configuration.
//!
//! Configuration is stored in `.quire/config.toml` and includes:
//! - `client_id`: the name this replica writes into the sync lock
//! - `[sync]`: where the shared store lives and how long a lock is declared for

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::identity;

const WORK_DIR_NAME: &str = ".quire";
const CONFIG_FILE_NAME: &str = "config.toml";
const NOTES_DIR_NAME: &str = "notes";
const SYNC_LOCK_FILE_NAME: &str = "sync.lock";
const LOCK_OBSERVATION_FILE_NAME: &str = "store-lock.json";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

pub const DEFAULT_LOCK_DURATION_SECS: u64 = 120;
pub const MIN_LOCK_DURATION_SECS: u64 = 30;

/// Replica configuration stored in `.quire/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name written into the store lock. Defaults to the user's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Shared store settings (absent = sync not configured).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncConfig>,
}

/// The `[sync]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Shared folder holding the store. Relative paths are taken from the
    /// project root (the directory containing `.quire/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Lock duration declared to other clients, in seconds.
    #[serde(default = "default_lock_duration_secs")]
    pub lock_duration_secs: u64,
}

fn default_lock_duration_secs() -> u64 {
    DEFAULT_LOCK_DURATION_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig { path: None, lock_duration_secs: DEFAULT_LOCK_DURATION_SECS }
    }
}

impl Config {
    /// Loads configuration from the given `.quire/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.quire/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match &self.sync {
            Some(sync) if sync.lock_duration_secs < MIN_LOCK_DURATION_SECS => {
                Err(Error::LockDurationTooShort(sync.lock_duration_secs))
            }
            _ => Ok(()),
        }
    }

    /// The configured client id, or the user's name.
    pub fn client_id(&self) -> String {
        match self.client_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => identity::default_client_id(),
        }
    }

    pub fn lock_duration(&self) -> Duration {
        let secs = self.sync.as_ref().map_or(DEFAULT_LOCK_DURATION_SECS, |s| s.lock_duration_secs);
        Duration::from_secs(secs.max(MIN_LOCK_DURATION_SECS))
    }

    /// Resolves the store path against the project root.
    pub fn store_path(&self, work_dir: &Path) -> Option<PathBuf> {
        let path = self.sync.as_ref()?.path.as_ref()?;
        if path.is_absolute() {
            Some(path.clone())
        } else {
            Some(work_dir.parent().unwrap_or(work_dir).join(path))
        }
    }

    /// Points the replica at a different store, keeping other sync settings.
    pub fn set_store_path(&mut self, path: PathBuf) {
        self.sync.get_or_insert_with(SyncConfig::default).path = Some(path);
    }
}

/// Find the .quire directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Creates `.quire/` under `root` with a config and an empty notes folder.
pub fn init_work_dir(root: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = root.join(WORK_DIR_NAME);
    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    fs::create_dir_all(notes_dir(&work_dir))?;
    config.save(&work_dir)?;
    fs::write(
        work_dir.join(GITIGNORE_FILE_NAME),
        format!("{}\n{}\n", SYNC_LOCK_FILE_NAME, LOCK_OBSERVATION_FILE_NAME),
    )?;
    Ok(work_dir)
}

/// Directory holding the replica's notes and its client manifest.
pub fn notes_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(NOTES_DIR_NAME)
}

/// File locked for the duration of `quire sync`.
pub fn sync_lock_path(work_dir: &Path) -> PathBuf {
    work_dir.join(SYNC_LOCK_FILE_NAME)
}

/// File remembering a foreign store lock between `quire sync` runs.
pub fn lock_observation_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOCK_OBSERVATION_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

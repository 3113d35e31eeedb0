// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The shared sync lock.
//!
//! A client holding an open transaction publishes a [`LockClaim`] as the
//! `lock` file at the store root. Other clients never trust the timestamps
//! inside it: staleness is judged by watching the claim's fingerprint for
//! the claimed duration on the observer's own clock (see
//! [`LockObservation`]). Each renewal bumps `renew_count`, which changes the
//! fingerprint and restarts every observer's wait.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::elapsed_at_least;
use crate::error::Result;
use crate::revision::Revision;

/// File name of the lock at the store root.
pub const LOCK_FILE: &str = "lock";

/// How long a claim stays valid without renewal.
pub const DEFAULT_LOCK_DURATION: Duration = Duration::from_secs(120);

/// Contents of the `lock` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockClaim {
    /// Identity of the client holding the lock.
    pub client_id: String,
    /// Unique per transaction; used to tell our claim from a successor's.
    pub transaction_id: Uuid,
    /// Number of renewals since the claim was first published.
    pub renew_count: u32,
    #[serde(rename = "duration_secs", with = "duration_secs")]
    pub duration: Duration,
    /// Revision the holder intends to commit.
    pub revision: Revision,
}

impl LockClaim {
    /// Creates a fresh claim for a new transaction.
    pub fn new(client_id: impl Into<String>, revision: Revision, duration: Duration) -> Self {
        LockClaim {
            client_id: client_id.into(),
            transaction_id: Uuid::new_v4(),
            renew_count: 0,
            duration,
            revision,
        }
    }

    /// Returns the claim after one more renewal.
    pub fn renewed(&self) -> Self {
        LockClaim { renew_count: self.renew_count.saturating_add(1), ..self.clone() }
    }

    /// Returns a string that changes whenever any field of the claim changes.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.client_id,
            self.transaction_id,
            self.renew_count,
            self.duration.as_secs(),
            self.revision
        )
    }

    /// Parses lock file contents.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Serializes the claim for the lock file.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Decision about a lock held by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockVerdict {
    /// The lock is live, or has not been watched long enough.
    Wait,
    /// The lock has not changed for its full duration and may be removed.
    Expired,
}

/// Remembers the last foreign lock this client saw and when it first saw it.
///
/// Outlives individual sync attempts: a client that keeps retrying against
/// an abandoned lock accumulates observation time across attempts. Clients
/// that do not stay running persist it between attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockObservation {
    #[serde(default)]
    first_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    fingerprint: Option<String>,
}

impl LockObservation {
    /// Creates an observation that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting of a lock and decides whether it is stale.
    ///
    /// A fingerprint that differs from the previous sighting restarts the
    /// wait at `now`.
    pub fn observe(&mut self, fingerprint: &str, duration: Duration, now: DateTime<Utc>) -> LockVerdict {
        match (&self.fingerprint, self.first_seen) {
            (Some(seen), Some(first_seen)) if seen == fingerprint => {
                if elapsed_at_least(first_seen, now, duration) {
                    LockVerdict::Expired
                } else {
                    LockVerdict::Wait
                }
            }
            _ => {
                tracing::debug!(fingerprint, "observed new sync lock");
                self.fingerprint = Some(fingerprint.to_string());
                self.first_seen = Some(now);
                LockVerdict::Wait
            }
        }
    }

    /// Forgets the last sighting.
    pub fn reset(&mut self) {
        self.first_seen = None;
        self.fingerprint = None;
    }

    /// Returns true if no lock is being watched.
    pub fn is_empty(&self) -> bool {
        self.fingerprint.is_none()
    }

    /// Returns the fingerprint currently being watched.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

//! Thread-safe in-memory balance store
//!
//! `MemoryStore` keeps one [`UserBalanceRecord`] per user in a `DashMap`.
//! DashMap locks the entry for the duration of a mutable borrow, which makes
//! every `apply` a single atomic conditional update: the guard check and the
//! increments happen under the same lock, so two concurrent debits can never
//! both observe the same balance.
//!
//! The store can be seeded from and written back to a JSON snapshot, which is
//! how the sweeper binary runs against exported user data.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::core::traits::{BalanceStore, UpdateOutcome};
use crate::types::{
    CounterUpdate, EconomyError, Subscription, UpdateFailure, UserBalanceRecord, UserId,
};

/// On-disk snapshot layout
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    users: Vec<UserBalanceRecord>,
}

/// DashMap-backed [`BalanceStore`]
///
/// Operations on different users proceed in parallel; operations on the same
/// user are serialized by the entry lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserBalanceRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Build a store holding `records`; a later duplicate replaces an earlier one
    pub fn from_records(records: impl IntoIterator<Item = UserBalanceRecord>) -> Self {
        let users = DashMap::new();
        for record in records {
            users.insert(record.user_id.clone(), record);
        }
        Self { users }
    }

    /// Load a JSON snapshot written by [`MemoryStore::write_snapshot`]
    pub fn load_snapshot(path: &Path) -> Result<Self, EconomyError> {
        let file = File::open(path).map_err(|e| EconomyError::Snapshot {
            message: format!("{}: {}", path.display(), e),
        })?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), users = snapshot.users.len(), "Loaded balance snapshot");
        Ok(Self::from_records(snapshot.users))
    }

    /// Write every record as a JSON snapshot, sorted by user id
    ///
    /// The previous snapshot at `path` stays intact until the new one is
    /// fully written.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), EconomyError> {
        let snapshot = Snapshot {
            users: self.records(),
        };
        replace_atomically(path, |writer| {
            serde_json::to_writer_pretty(writer, &snapshot)?;
            Ok(())
        })?;
        debug!(path = %path.display(), users = snapshot.users.len(), "Wrote balance snapshot");
        Ok(())
    }

    /// Clones of all records, sorted by user id
    ///
    /// A snapshot at the time of the call; concurrent updates may land right
    /// after it returns.
    pub fn records(&self) -> Vec<UserBalanceRecord> {
        let mut records: Vec<UserBalanceRecord> =
            self.users.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        records
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Write a sibling temp file, then rename it over `path`
///
/// On any failure the temp file is removed and `path` is left untouched.
fn replace_atomically<F>(path: &Path, write: F) -> Result<(), EconomyError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), EconomyError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| EconomyError::from(e.error))?;
    Ok(())
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn insert(&self, record: UserBalanceRecord) -> Result<(), EconomyError> {
        let user = record.user_id.clone();
        let mut created = false;
        self.users.entry(user.clone()).or_insert_with(|| {
            created = true;
            record
        });

        if created {
            Ok(())
        } else {
            Err(EconomyError::already_exists(&user))
        }
    }

    async fn load(&self, user: &UserId) -> Result<UserBalanceRecord, EconomyError> {
        self.users
            .get(user)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EconomyError::not_found(user))
    }

    async fn apply(
        &self,
        user: &UserId,
        update: &CounterUpdate,
    ) -> Result<UpdateOutcome, EconomyError> {
        let mut entry = self
            .users
            .get_mut(user)
            .ok_or_else(|| EconomyError::not_found(user))?;
        let record = entry.value_mut();

        let mut balances = record.balances();
        match update.apply_to(&mut balances) {
            Ok(()) => {
                record.set_balances(balances.clone());
                Ok(UpdateOutcome::Applied(balances))
            }
            Err(UpdateFailure::Guard(counter)) => Ok(UpdateOutcome::Rejected { counter, balances }),
            Err(UpdateFailure::Overflow(counter)) => {
                Err(EconomyError::arithmetic_overflow(counter, user))
            }
        }
    }

    async fn replace_subscription(
        &self,
        user: &UserId,
        subscription: Subscription,
    ) -> Result<(), EconomyError> {
        let mut entry = self
            .users
            .get_mut(user)
            .ok_or_else(|| EconomyError::not_found(user))?;
        entry.value_mut().subscription = subscription;
        Ok(())
    }

    async fn expire_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, EconomyError> {
        let mut expired = 0;
        for mut entry in self.users.iter_mut() {
            let subscription = &mut entry.value_mut().subscription;
            if subscription.is_due_for_expiry(now) {
                subscription.expire(now);
                expired += 1;
            }
        }
        Ok(expired)
    }
}

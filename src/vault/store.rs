// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Record Storage
//!
//! The storage collaborator behind the vault services: a durable record
//! store for the server key singleton, session rows, write-once secrets,
//! and each account's EC-LCG nonce state. Services depend only on the
//! [`VaultStore`] trait; [`MemoryVaultStore`] is the in-process
//! implementation used by tests and single-node deployments.
//!
//! Two concurrency guarantees live here:
//!
//! - secret inserts are atomic per `(owner, secret_id)`: two racing
//!   stores resolve to exactly one success and one `SecretAlreadyExists`
//! - [`VaultStore::lock_account`] hands out a per-account mutex guard so
//!   at most one nonce consumption is in flight per account at a time

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::crypto::eclcg::STATE_BYTE_LENGTH;
use crate::crypto::{AES_KEY_LENGTH, POINT_BYTE_LENGTH};

use super::error::VaultError;

/// Singleton long-term server key row
#[derive(Debug, Clone)]
pub struct ServerKeyRecord {
    pub scalar: [u8; POINT_BYTE_LENGTH],
    pub public_x: [u8; POINT_BYTE_LENGTH],
    pub public_y: [u8; POINT_BYTE_LENGTH],
    pub created_at: DateTime<Utc>,
}

/// One vault session row
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub owner: String,
    pub client_pub_x: [u8; POINT_BYTE_LENGTH],
    pub client_pub_y: [u8; POINT_BYTE_LENGTH],
    pub client_eph_x: [u8; POINT_BYTE_LENGTH],
    pub client_eph_y: [u8; POINT_BYTE_LENGTH],
    pub session_scalar: [u8; POINT_BYTE_LENGTH],
    pub session_pub_x: [u8; POINT_BYTE_LENGTH],
    pub session_pub_y: [u8; POINT_BYTE_LENGTH],
    pub aes_key: [u8; AES_KEY_LENGTH],
    /// Remaining signatures; meaningful only when a limit is configured
    pub signature_budget: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One stored secret, unique per (owner, secret_id)
#[derive(Debug, Clone)]
pub struct SecretRecord {
    pub owner: String,
    pub secret_id: String,
    pub public_x: [u8; POINT_BYTE_LENGTH],
    pub public_y: [u8; POINT_BYTE_LENGTH],
    pub plaintext: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

/// An account's EC-LCG state in persisted form
#[derive(Debug, Clone)]
pub struct PackedNonceState {
    pub modulus: [u8; STATE_BYTE_LENGTH],
    pub multiplier: [u8; STATE_BYTE_LENGTH],
    pub increment: [u8; STATE_BYTE_LENGTH],
    pub value: [u8; STATE_BYTE_LENGTH],
}

/// Storage operations the vault services need
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Load the server key singleton if one has been persisted
    async fn load_server_key(&self) -> Result<Option<ServerKeyRecord>, VaultError>;

    /// Persist the server key if none exists yet; returns the stored row
    /// (the first writer wins, so concurrent creation stays idempotent)
    async fn save_server_key(&self, record: ServerKeyRecord)
        -> Result<ServerKeyRecord, VaultError>;

    async fn insert_session(&self, record: SessionRecord) -> Result<(), VaultError>;

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>, VaultError>;

    /// Decrement a session's signature budget by one, returning the
    /// remaining budget; fails with `BudgetExhausted` at zero
    async fn decrement_session_budget(&self, session_id: &str) -> Result<u32, VaultError>;

    /// Remove sessions whose expiry has passed; returns how many were
    /// removed. Live sessions are never touched.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, VaultError>;

    /// Insert a secret; fails with `SecretAlreadyExists` when the
    /// `(owner, secret_id)` pair is already present. Atomic: of two racing
    /// inserts exactly one succeeds.
    async fn insert_secret(&self, record: SecretRecord) -> Result<(), VaultError>;

    async fn load_secret(
        &self,
        owner: &str,
        secret_id: &str,
    ) -> Result<Option<SecretRecord>, VaultError>;

    /// All secrets for an owner, ordered by secret id
    async fn list_secrets(&self, owner: &str) -> Result<Vec<SecretRecord>, VaultError>;

    /// Acquire the account's nonce lock; hold the guard across the whole
    /// fetch-advance-persist cycle
    async fn lock_account(&self, account: &str) -> OwnedMutexGuard<()>;

    async fn load_account_state(
        &self,
        account: &str,
    ) -> Result<Option<PackedNonceState>, VaultError>;

    async fn save_account_state(
        &self,
        account: &str,
        state: PackedNonceState,
    ) -> Result<(), VaultError>;
}

/// In-memory implementation of [`VaultStore`]
///
/// Thread-safe via `tokio` locks; rows live as long as the process. The
/// account lock map grows with the user population and entries are
/// retained once created.
#[derive(Clone, Default)]
pub struct MemoryVaultStore {
    server_key: Arc<RwLock<Option<ServerKeyRecord>>>,
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    secrets: Arc<RwLock<HashMap<(String, String), SecretRecord>>>,
    account_states: Arc<RwLock<HashMap<String, PackedNonceState>>>,
    account_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl MemoryVaultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultStore for MemoryVaultStore {
    async fn load_server_key(&self) -> Result<Option<ServerKeyRecord>, VaultError> {
        Ok(self.server_key.read().await.clone())
    }

    async fn save_server_key(
        &self,
        record: ServerKeyRecord,
    ) -> Result<ServerKeyRecord, VaultError> {
        let mut slot = self.server_key.write().await;
        match slot.as_ref() {
            Some(existing) => Ok(existing.clone()),
            None => {
                *slot = Some(record.clone());
                Ok(record)
            }
        }
    }

    async fn insert_session(&self, record: SessionRecord) -> Result<(), VaultError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.id.clone(), record);
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>, VaultError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn decrement_session_budget(&self, session_id: &str) -> Result<u32, VaultError> {
        let mut sessions = self.sessions.write().await;
        let record = sessions
            .get_mut(session_id)
            .ok_or(VaultError::SessionNotFound)?;
        if record.signature_budget == 0 {
            return Err(VaultError::BudgetExhausted);
        }
        record.signature_budget -= 1;
        Ok(record.signature_budget)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, VaultError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at >= now);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!("🗑️  Purged {} expired vault session(s)", removed);
        }
        Ok(removed)
    }

    async fn insert_secret(&self, record: SecretRecord) -> Result<(), VaultError> {
        let mut secrets = self.secrets.write().await;
        let key = (record.owner.clone(), record.secret_id.clone());
        match secrets.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => {
                Err(VaultError::SecretAlreadyExists {
                    owner: record.owner,
                    secret_id: record.secret_id,
                })
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn load_secret(
        &self,
        owner: &str,
        secret_id: &str,
    ) -> Result<Option<SecretRecord>, VaultError> {
        let secrets = self.secrets.read().await;
        Ok(secrets
            .get(&(owner.to_string(), secret_id.to_string()))
            .cloned())
    }

    async fn list_secrets(&self, owner: &str) -> Result<Vec<SecretRecord>, VaultError> {
        let secrets = self.secrets.read().await;
        let mut rows: Vec<SecretRecord> = secrets
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.secret_id.cmp(&b.secret_id));
        Ok(rows)
    }

    async fn lock_account(&self, account: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.account_locks.lock().await;
            locks
                .entry(account.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    async fn load_account_state(
        &self,
        account: &str,
    ) -> Result<Option<PackedNonceState>, VaultError> {
        Ok(self.account_states.read().await.get(account).cloned())
    }

    async fn save_account_state(
        &self,
        account: &str,
        state: PackedNonceState,
    ) -> Result<(), VaultError> {
        let mut states = self.account_states.write().await;
        states.insert(account.to_string(), state);
        Ok(())
    }
}

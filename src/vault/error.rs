// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Error Types
//!
//! Domain error kinds surfaced to callers of the vault services. Every
//! cryptographic verification failure is reported as the single generic
//! `InvalidProof` rejection so callers cannot learn which stage failed.
//! Storage-layer failures stay opaque behind `Storage`.

use thiserror::Error;

use crate::crypto::error::CryptoError;

/// Domain error kinds for session and secret operations
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed or off-curve point coordinates
    #[error("invalid curve point: {0}")]
    InvalidPoint(String),

    /// Malformed request payload (bad hex, wrong field width, bad padding)
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// No session with this id owned by the caller
    #[error("vault session not found")]
    SessionNotFound,

    /// Session exists but its lifetime has elapsed
    #[error("vault session has expired; create a new session to continue")]
    SessionExpired,

    /// Secrets are write-once per (owner, secret_id)
    #[error("secret already exists for owner '{owner}' with secret_id '{secret_id}'")]
    SecretAlreadyExists { owner: String, secret_id: String },

    #[error("secret not found")]
    SecretNotFound,

    /// Generic rejection for any failed proof or signature verification
    #[error("proof verification failed")]
    InvalidProof,

    /// Session signature budget cannot cover the request
    #[error("session signature budget exhausted")]
    BudgetExhausted,

    /// A new owner's secret needs a public key to verify retrievals against
    #[error("public key required for new owner")]
    PublicKeyRequired,

    /// Missing or placeholder secret material at startup; fatal
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Underlying storage failure; cause stays internal
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPoint { reason } => VaultError::InvalidPoint(reason),
            other => VaultError::InvalidPayload(other.to_string()),
        }
    }
}

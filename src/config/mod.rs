// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Node Configuration
//!
//! Settings are read from environment variables and validated once at
//! startup. Secret material must be present and non-placeholder before the
//! service will start; a bad value is a fatal `Configuration` error, never
//! a silent fallback.
//!
//! ## Security Considerations
//!
//! - `VAULT_MANAGER_SECRET_KEY` is required; it seeds the manager and
//!   attestation scalars and is NEVER logged
//! - `VAULT_SERVER_SECRET_KEY` is optional; when unset the server's
//!   long-term scalar is drawn at random on first use
//! - Placeholder markers (`REPLACE_ME`, `CHANGE_ME`) are rejected outright

use crate::vault::error::VaultError;

pub const ENV_MANAGER_SECRET: &str = "VAULT_MANAGER_SECRET_KEY";
pub const ENV_SERVER_SECRET: &str = "VAULT_SERVER_SECRET_KEY";
pub const ENV_SESSION_LIFETIME: &str = "VAULT_SESSION_LIFETIME";
pub const ENV_SESSION_SIGNATURE_LIMIT: &str = "VAULT_SESSION_SIGNATURE_LIMIT";
pub const ENV_SELF_OWNER_LABEL: &str = "VAULT_SELF_OWNER_LABEL";

const PLACEHOLDER_MARKERS: [&str; 2] = ["REPLACE_ME", "CHANGE_ME"];
const MIN_SECRET_LENGTH: usize = 32;
const MIN_SESSION_LIFETIME_SECS: u64 = 60;

const DEFAULT_SESSION_LIFETIME_SECS: u64 = 3600;
const DEFAULT_SELF_OWNER_LABEL: &str = "Bob";

/// Validated runtime settings for the vault services
#[derive(Debug, Clone)]
pub struct VaultSettings {
    /// Seeds the manager/attestation scalar derivation
    pub manager_secret: String,
    /// Optional deterministic seed for the server's long-term key
    pub server_secret: Option<String>,
    /// Session lifetime in seconds (floor of 60)
    pub session_lifetime_secs: u64,
    /// Signatures allowed per session; 0 means unlimited
    pub session_signature_limit: u32,
    /// Owner label whose secrets are self-custodied under the server key
    pub self_owner_label: String,
}

impl VaultSettings {
    /// Build settings from explicit values, validating secret material
    pub fn new(
        manager_secret: impl Into<String>,
        server_secret: Option<String>,
        session_lifetime_secs: u64,
        session_signature_limit: u32,
        self_owner_label: impl Into<String>,
    ) -> Result<Self, VaultError> {
        let manager_secret = manager_secret.into();
        ensure_secret(&manager_secret, ENV_MANAGER_SECRET)?;

        let server_secret = match server_secret {
            Some(value) if !value.trim().is_empty() => {
                ensure_secret(&value, ENV_SERVER_SECRET)?;
                Some(value)
            }
            _ => None,
        };

        if session_lifetime_secs < MIN_SESSION_LIFETIME_SECS {
            return Err(VaultError::Configuration(format!(
                "{} must be at least {} seconds",
                ENV_SESSION_LIFETIME, MIN_SESSION_LIFETIME_SECS
            )));
        }

        let self_owner_label = self_owner_label.into();
        if self_owner_label.trim().is_empty() {
            return Err(VaultError::Configuration(format!(
                "{} must not be blank",
                ENV_SELF_OWNER_LABEL
            )));
        }

        Ok(VaultSettings {
            manager_secret,
            server_secret,
            session_lifetime_secs,
            session_signature_limit,
            self_owner_label,
        })
    }

    /// Read and validate settings from the environment
    pub fn from_env() -> Result<Self, VaultError> {
        let manager_secret = std::env::var(ENV_MANAGER_SECRET)
            .map_err(|_| {
                VaultError::Configuration(format!("{} is not set", ENV_MANAGER_SECRET))
            })?
            .trim()
            .to_string();

        let server_secret = std::env::var(ENV_SERVER_SECRET)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let session_lifetime_secs = parse_env_number(
            ENV_SESSION_LIFETIME,
            DEFAULT_SESSION_LIFETIME_SECS,
        )?;
        let session_signature_limit = parse_env_number(ENV_SESSION_SIGNATURE_LIMIT, 0u32)?;

        let self_owner_label = std::env::var(ENV_SELF_OWNER_LABEL)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SELF_OWNER_LABEL.to_string());

        Self::new(
            manager_secret,
            server_secret,
            session_lifetime_secs,
            session_signature_limit,
            self_owner_label,
        )
    }
}

/// Validate that a secret is not blank, placeholder, or trivially short
fn ensure_secret(value: &str, name: &str) -> Result<(), VaultError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VaultError::Configuration(format!("{} is blank", name)));
    }
    for marker in PLACEHOLDER_MARKERS {
        if trimmed.contains(marker) {
            return Err(VaultError::Configuration(format!(
                "{} contains a placeholder value; replace it before running the service",
                name
            )));
        }
    }
    if trimmed.len() < MIN_SECRET_LENGTH {
        return Err(VaultError::Configuration(format!(
            "{} must be at least {} characters",
            name, MIN_SECRET_LENGTH
        )));
    }
    Ok(())
}

fn parse_env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T, VaultError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            VaultError::Configuration(format!("{} is not a valid number: {:?}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

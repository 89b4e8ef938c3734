// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod config;
pub mod crypto;
pub mod vault;

// Re-export the main service types
pub use config::VaultSettings;
pub use crypto::{curve, CryptoError, NonceState, Point};
pub use vault::{
    HandshakeResult, MemoryVaultStore, SecretService, SessionService, VaultError, VaultStore,
};

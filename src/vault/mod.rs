// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Service Module
//!
//! The protocol surface over the crypto primitives: session handshake and
//! liveness, write-once secret storage gated by Schnorr proofs, EC-LCG
//! backed signing, and attestation receipts. Storage is abstracted behind
//! [`store::VaultStore`]; everything HTTP-shaped (framing, auth, throttling)
//! lives outside this crate and supplies only the caller's authenticated
//! identity.

pub mod error;
pub mod secrets;
pub mod session;
pub mod store;
pub mod wire;

pub use error::VaultError;
pub use secrets::{AttestationReceipt, SecretService, SignatureListing, SignedSecret};
pub use session::{HandshakeResult, SessionService};
pub use store::{
    MemoryVaultStore, PackedNonceState, SecretRecord, ServerKeyRecord, SessionRecord, VaultStore,
};
pub use wire::{
    AttestResponse, AttestationKeyResponse, AttestationWire, HandshakeRequest, HandshakeResponse,
    ListSignaturesResponse, PointWire, ProofWire, RetrieveSecretRequest, RetrieveSecretResponse,
    SignatureEntry, StoreSecretRequest, StoreSecretResponse,
};

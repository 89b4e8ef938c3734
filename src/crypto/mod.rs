// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Cryptography Module
//!
//! This module implements the cryptographic primitives the vault protocol
//! is built from:
//!
//! - **Curve**: affine secp192r1 point arithmetic
//! - **ECDSA**: deterministic-nonce signing and verification
//! - **EC-LCG**: per-account nonce state for signing nonces
//! - **Schnorr**: Fiat-Shamir proofs gating retrieval and attestation
//! - **Cipher**: AES-128-ECB session payload encryption
//! - **Keys**: scalar derivation from configured secret material
//!
//! ## Security Considerations
//!
//! - Scalars handed to the point math are used as-is; reduction modulo the
//!   group order is the caller's responsibility (the handshake relies on an
//!   unreduced combined scalar)
//! - Session AES keys and derived scalars are never logged
//! - EC-LCG state is only advanced through the store's per-account lock

pub mod cipher;
pub mod curve;
pub mod ecdsa;
pub mod eclcg;
pub mod error;
pub mod keys;
pub mod schnorr;

pub use cipher::{decrypt_ecb, encrypt_ecb, AES_KEY_LENGTH};
pub use curve::{curve, hash_point, public_key_from_scalar, Curve, Point, POINT_BYTE_LENGTH};
pub use eclcg::{NonceState, STATE_BYTE_LENGTH};
pub use error::CryptoError;
pub use keys::{derive_attestation_scalar, derive_manager_scalar, random_scalar};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Typed failures for the vault's cryptographic primitives. The service
//! layer (`crate::vault`) converts these into its own domain error kinds,
//! so nothing below the service boundary needs to know how a failure is
//! reported to a caller.

use thiserror::Error;

/// Error type for curve, cipher, and nonce-state operations
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// Coordinates are malformed or do not satisfy the curve equation
    #[error("invalid curve point: {reason}")]
    InvalidPoint { reason: String },

    /// Scalar outside the usable range (zero after reduction mod n)
    #[error("invalid scalar: {reason}")]
    InvalidScalar { reason: String },

    /// A packed EC-LCG state field has the wrong width
    #[error("invalid nonce state field '{field}': expected {expected} bytes, got {actual}")]
    InvalidStateField {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Ciphertext is empty or not a whole number of AES blocks
    #[error("invalid ciphertext: {reason}")]
    InvalidCiphertext { reason: String },

    /// PKCS#7 padding did not verify after decryption
    #[error("invalid block padding")]
    InvalidPadding,
}

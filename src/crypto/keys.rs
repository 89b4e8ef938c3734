// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scalar Derivation from Configured Secrets
//!
//! The manager secret and the attestation scalar both originate from the
//! same tenant-configured secret material. Derivation hashes the UTF-8
//! secret with SHA-512 and reduces it modulo the curve order, forcing the
//! (negligible) zero case to one so the result is always a usable scalar.
//!
//! Secret material is never logged.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use sha2::{Digest, Sha512};

use super::curve::{curve, normalize_scalar};

/// Derive the manager's secp192r1 private scalar from secret material
pub fn derive_manager_scalar(secret: &str) -> BigUint {
    let digest = Sha512::digest(secret.as_bytes());
    normalize_scalar(&BigUint::from_bytes_be(&digest), &curve().n)
}

/// Derive the attestation signing scalar
///
/// Attestation receipts are signed with key material independent of any
/// session; today it is the manager derivation under another name, kept
/// separate so the two can diverge without touching call sites.
pub fn derive_attestation_scalar(secret: &str) -> BigUint {
    derive_manager_scalar(secret)
}

/// Derive the server's long-term scalar
///
/// With configured secret material the scalar is deterministic
/// (SHA-512 reduced mod n, zero forced to one); without it a uniform
/// scalar in `[1, n-1]` is drawn.
pub fn derive_server_scalar(secret: Option<&str>) -> BigUint {
    match secret {
        Some(value) if !value.trim().is_empty() => derive_manager_scalar(value),
        _ => random_scalar(),
    }
}

/// Uniform random scalar in `[1, n-1]`
pub fn random_scalar() -> BigUint {
    let n = &curve().n;
    let mut rng = rand::thread_rng();
    rng.gen_biguint_below(&(n - BigUint::one())) + BigUint::one()
}

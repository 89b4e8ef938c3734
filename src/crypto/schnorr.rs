// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Schnorr Proofs of Knowledge
//!
//! Fiat-Shamir proofs over secp192r1. The challenge binds the public point,
//! the commitment, and any caller-supplied context bytes (owner labels,
//! secret hashes), so a proof cannot be replayed under a different context.
//!
//! The retrieval path only ever verifies proofs supplied by callers; the
//! attestation path is the one place the server proves, using the
//! attestation scalar rather than any session key.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use sha2::{Digest, Sha256};

use super::curve::{curve, scalar_to_bytes, Point, POINT_BYTE_LENGTH};

/// Fiat-Shamir challenge: `SHA256(Px ‖ Py ‖ Tx ‖ Ty ‖ context…) mod n`,
/// forced to one when the reduction is zero
pub fn compute_challenge(public_point: &Point, commitment: &Point, context: &[&[u8]]) -> BigUint {
    let mut material = Vec::with_capacity(POINT_BYTE_LENGTH * 4);
    material.extend_from_slice(&scalar_to_bytes(public_point.x()));
    material.extend_from_slice(&scalar_to_bytes(public_point.y()));
    material.extend_from_slice(&scalar_to_bytes(commitment.x()));
    material.extend_from_slice(&scalar_to_bytes(commitment.y()));
    for chunk in context {
        material.extend_from_slice(chunk);
    }
    let digest = Sha256::digest(&material);
    let challenge = BigUint::from_bytes_be(&digest) % &curve().n;
    if challenge.is_zero() {
        BigUint::one()
    } else {
        challenge
    }
}

/// Verify a proof `(T, s)` of knowledge of the discrete log of
/// `public_point`: accept iff `G·s == T + public_point·challenge`
pub fn verify_proof(public_point: &Point, commitment: &Point, s: &BigUint, context: &[&[u8]]) -> bool {
    let challenge = compute_challenge(public_point, commitment, context);
    let lhs = curve().generator().scalar_mul(&BigInt::from(s.clone()));
    let rhs = commitment.add(&public_point.scalar_mul(&BigInt::from(challenge)));
    lhs.equals(&rhs)
}

/// Produce a proof `(T, s)` for `secret_scalar` under the given context
///
/// `T = G·k`, `s = (k + challenge·secret_scalar) mod n`. The nonce `k` is
/// caller-supplied; the vault feeds it from the account's EC-LCG state.
pub fn create_proof(
    secret_scalar: &BigUint,
    nonce: &BigUint,
    public_point: &Point,
    context: &[&[u8]],
) -> (Point, BigUint) {
    let n = &curve().n;
    let commitment = curve().generator().scalar_mul(&BigInt::from(nonce.clone()));
    let challenge = compute_challenge(public_point, &commitment, context);
    let s = (nonce + challenge * secret_scalar) % n;
    (commitment, s)
}

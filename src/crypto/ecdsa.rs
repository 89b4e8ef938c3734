// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDSA over secp192r1 with Caller-Controlled Nonces
//!
//! Signing takes the nonce explicitly: the vault feeds it from each
//! account's EC-LCG state rather than drawing fresh randomness, so the
//! signer itself is deterministic. The usual degenerate cases (identity
//! commitment point, `r == 0`, `s == 0`) are handled by bumping the nonce
//! and retrying; callers must not assume the first nonce is the one used.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use super::curve::{curve, mod_inverse, normalize_scalar, Point};

/// Sign a message digest, returning the `(r, s)` pair
///
/// `private_scalar` and `nonce` are normalized into `[1, n-1]` (reduced mod
/// n, zero forced to one). The digest is interpreted as a big-endian
/// integer reduced mod n.
pub fn sign_digest(private_scalar: &BigUint, nonce: &BigUint, digest: &[u8]) -> (BigUint, BigUint) {
    let c = curve();
    let n = &c.n;
    let d = normalize_scalar(private_scalar, n);
    let mut k = normalize_scalar(nonce, n);
    let z = BigUint::from_bytes_be(digest) % n;

    loop {
        let commitment = c.generator().scalar_mul(&BigInt::from(k.clone()));
        if commitment.is_identity() {
            k = bump_nonce(k, n);
            continue;
        }
        let r = commitment.x() % n;
        if r.is_zero() {
            k = bump_nonce(k, n);
            continue;
        }
        let k_inv = mod_inverse(&k, n);
        let s = (k_inv * ((&z + &r * &d) % n)) % n;
        if s.is_zero() {
            k = bump_nonce(k, n);
            continue;
        }
        return (r, s);
    }
}

/// Verify an `(r, s)` signature over a digest against a public key point
pub fn verify_signature(public_key: &Point, r: &BigUint, s: &BigUint, digest: &[u8]) -> bool {
    let c = curve();
    let n = &c.n;
    if r.is_zero() || s.is_zero() || r >= n || s >= n {
        return false;
    }
    let z = BigUint::from_bytes_be(digest) % n;
    let s_inv = mod_inverse(s, n);
    let u1 = (&z * &s_inv) % n;
    let u2 = (r * &s_inv) % n;
    let candidate = c
        .generator()
        .scalar_mul(&BigInt::from(u1))
        .add(&public_key.scalar_mul(&BigInt::from(u2)));
    if candidate.is_identity() {
        return false;
    }
    (candidate.x() % n) == *r
}

/// Next usable nonce: increment, wrap mod n, never zero
fn bump_nonce(k: BigUint, n: &BigUint) -> BigUint {
    let next = (k + BigUint::one()) % n;
    if next.is_zero() {
        BigUint::one()
    } else {
        next
    }
}

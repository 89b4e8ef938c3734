// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-Account EC-LCG Nonce State
//!
//! Each account owns a linear-congruential generator over a private prime
//! modulus; advancing it yields the next signing nonce and the next state.
//! State fields are persisted as fixed-width 32-byte big-endian strings and
//! unpacking refuses any field of the wrong width instead of truncating.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;

use super::error::CryptoError;

/// Persisted byte width of every EC-LCG state field
pub const STATE_BYTE_LENGTH: usize = 32;

const MILLER_RABIN_ROUNDS: usize = 20;

/// EC-LCG parameters and current value for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceState {
    pub modulus: BigUint,
    pub multiplier: BigUint,
    pub increment: BigUint,
    pub value: BigUint,
}

impl NonceState {
    /// Create a fresh random state: a 256-bit prime modulus, a non-zero
    /// multiplier below it, and random increment and initial value below it
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let modulus = random_prime((STATE_BYTE_LENGTH * 8) as u64);
        let multiplier = rng.gen_biguint_below(&(&modulus - BigUint::one())) + BigUint::one();
        let increment = rng.gen_biguint_below(&modulus);
        let value = rng.gen_biguint_below(&modulus);
        NonceState {
            modulus,
            multiplier,
            increment,
            value,
        }
    }

    /// Advance the generator: `nonce = (A*V + C) mod M`, new state carries
    /// the nonce as its value. Pure function of the input state.
    pub fn advance(&self) -> (BigUint, NonceState) {
        let next_value = (&self.multiplier * &self.value + &self.increment) % &self.modulus;
        let next_state = NonceState {
            modulus: self.modulus.clone(),
            multiplier: self.multiplier.clone(),
            increment: self.increment.clone(),
            value: next_value.clone(),
        };
        (next_value, next_state)
    }

    /// Encode state fields as fixed-width big-endian byte strings
    pub fn pack(&self) -> [[u8; STATE_BYTE_LENGTH]; 4] {
        [
            int_to_state_bytes(&self.modulus),
            int_to_state_bytes(&self.multiplier),
            int_to_state_bytes(&self.increment),
            int_to_state_bytes(&self.value),
        ]
    }

    /// Decode persisted byte strings into a state
    ///
    /// Every field must be exactly [`STATE_BYTE_LENGTH`] bytes; a missing or
    /// short field is an error, never a silent truncation.
    pub fn unpack(
        modulus: &[u8],
        multiplier: &[u8],
        increment: &[u8],
        value: &[u8],
    ) -> Result<Self, CryptoError> {
        Ok(NonceState {
            modulus: state_bytes_to_int("modulus", modulus)?,
            multiplier: state_bytes_to_int("multiplier", multiplier)?,
            increment: state_bytes_to_int("increment", increment)?,
            value: state_bytes_to_int("value", value)?,
        })
    }
}

fn int_to_state_bytes(value: &BigUint) -> [u8; STATE_BYTE_LENGTH] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; STATE_BYTE_LENGTH];
    out[STATE_BYTE_LENGTH - bytes.len()..].copy_from_slice(&bytes);
    out
}

fn state_bytes_to_int(field: &'static str, raw: &[u8]) -> Result<BigUint, CryptoError> {
    if raw.len() != STATE_BYTE_LENGTH {
        return Err(CryptoError::InvalidStateField {
            field,
            expected: STATE_BYTE_LENGTH,
            actual: raw.len(),
        });
    }
    Ok(BigUint::from_bytes_be(raw))
}

/// Draw a random prime of exactly `bits` bits (top bit forced)
fn random_prime(bits: u64) -> BigUint {
    let mut rng = rand::thread_rng();
    let top_bit = BigUint::one() << (bits - 1);
    loop {
        let mut candidate = rng.gen_biguint(bits) | &top_bit;
        candidate.set_bit(0, true);
        if is_probably_prime(&candidate, MILLER_RABIN_ROUNDS) {
            return candidate;
        }
    }
}

/// Miller-Rabin probabilistic primality test
fn is_probably_prime(n: &BigUint, rounds: usize) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);
    if n < &two {
        return false;
    }
    if n == &two || n == &three {
        return true;
    }
    if !n.bit(0) {
        return false;
    }

    let mut d = n - BigUint::one();
    let mut r = 0u32;
    while !d.bit(0) {
        d >>= 1;
        r += 1;
    }

    let mut rng = rand::thread_rng();
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &(n - &two));
        let mut x = a.modpow(&d, n);

        if x.is_one() || x == n - BigUint::one() {
            continue 'witness;
        }

        for _ in 0..(r - 1) {
            x = x.modpow(&two, n);
            if x == n - BigUint::one() {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

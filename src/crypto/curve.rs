// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! secp192r1 Curve Primitives
//!
//! Affine point arithmetic on the secp192r1 curve used by the vault
//! handshake, ECDSA signing, and Schnorr attestation receipts. Points are
//! immutable values with explicit operations (`add`, `negate`, `scalar_mul`,
//! `equals`) rather than operator overloads.
//!
//! The identity element is represented explicitly (`infinity` flag) with
//! zeroed coordinates; it is never inferred from any coordinate convention.
//!
//! Scalars are **not** reduced modulo the group order here. Reduction is the
//! caller's responsibility: the handshake multiplies by a deliberately
//! unreduced combined scalar, and normalizing it inside the point math would
//! change that path's behavior.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use sha2::{Digest, Sha512};
use std::sync::OnceLock;

use super::error::CryptoError;

/// Byte width of a secp192r1 field element or scalar
pub const POINT_BYTE_LENGTH: usize = 24;

const P_HEX: &str = "fffffffffffffffffffffffffffffffeffffffffffffffff";
const A_HEX: &str = "fffffffffffffffffffffffffffffffefffffffffffffffc";
const B_HEX: &str = "64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1";
const N_HEX: &str = "ffffffffffffffffffffffff99def836146bc9b1b4d22831";
const GX_HEX: &str = "188da80eb03090f67cbf20eb43a18800f4ff0afd82ff1012";
const GY_HEX: &str = "07192b95ffc8da78631011ed6b24cdd573f977a11e794811";

/// Parameters and generator for secp192r1
pub struct Curve {
    /// Prime field modulus
    pub p: BigUint,
    /// Coefficient a
    pub a: BigUint,
    /// Coefficient b
    pub b: BigUint,
    /// Group order
    pub n: BigUint,
    generator: Point,
}

impl Curve {
    fn init() -> Self {
        let from_hex = |s: &str| BigUint::parse_bytes(s.as_bytes(), 16).expect("curve constant");
        let generator = Point {
            x: from_hex(GX_HEX),
            y: from_hex(GY_HEX),
            infinity: false,
        };
        Curve {
            p: from_hex(P_HEX),
            a: from_hex(A_HEX),
            b: from_hex(B_HEX),
            n: from_hex(N_HEX),
            generator,
        }
    }

    /// Base point G
    pub fn generator(&self) -> &Point {
        &self.generator
    }
}

/// Process-wide secp192r1 parameters
pub fn curve() -> &'static Curve {
    static CURVE: OnceLock<Curve> = OnceLock::new();
    CURVE.get_or_init(Curve::init)
}

/// Affine point on secp192r1
#[derive(Debug, Clone)]
pub struct Point {
    x: BigUint,
    y: BigUint,
    infinity: bool,
}

impl Point {
    /// The group's neutral element
    pub fn identity() -> Self {
        Point {
            x: BigUint::zero(),
            y: BigUint::zero(),
            infinity: true,
        }
    }

    /// Construct a point from affine coordinates, validating that it lies
    /// on the curve. Coordinates are reduced into `[0, p)` first.
    pub fn from_affine(x: BigUint, y: BigUint) -> Result<Self, CryptoError> {
        let c = curve();
        let point = Point {
            x: x % &c.p,
            y: y % &c.p,
            infinity: false,
        };
        if !point.is_on_curve() {
            return Err(CryptoError::InvalidPoint {
                reason: "coordinates do not satisfy the curve equation".to_string(),
            });
        }
        Ok(point)
    }

    /// x coordinate (zero for the identity element)
    pub fn x(&self) -> &BigUint {
        &self.x
    }

    /// y coordinate (zero for the identity element)
    pub fn y(&self) -> &BigUint {
        &self.y
    }

    pub fn is_identity(&self) -> bool {
        self.infinity
    }

    /// Check `y^2 = x^3 + ax + b (mod p)`; the identity is not a curve
    /// solution and reports `false`.
    pub fn is_on_curve(&self) -> bool {
        if self.infinity {
            return false;
        }
        let c = curve();
        let lhs = (&self.y * &self.y) % &c.p;
        let rhs = ((&self.x * &self.x * &self.x) + (&c.a * &self.x) + &c.b) % &c.p;
        lhs == rhs
    }

    /// Explicit equality: identities are equal regardless of coordinates
    pub fn equals(&self, other: &Point) -> bool {
        if self.infinity && other.infinity {
            return true;
        }
        self.infinity == other.infinity && self.x == other.x && self.y == other.y
    }

    /// Additive inverse
    pub fn negate(&self) -> Point {
        if self.infinity {
            return self.clone();
        }
        let p = &curve().p;
        Point {
            x: self.x.clone(),
            y: mod_sub(&BigUint::zero(), &self.y, p),
            infinity: false,
        }
    }

    /// Group addition. Doubling uses the tangent slope, general addition
    /// the secant slope; `P + (-P)` is detected by equal x coordinates and
    /// y coordinates summing to zero mod p.
    pub fn add(&self, other: &Point) -> Point {
        if self.infinity {
            return other.clone();
        }
        if other.infinity {
            return self.clone();
        }

        let c = curve();
        let p = &c.p;

        if self.x == other.x && ((&self.y + &other.y) % p).is_zero() {
            return Point::identity();
        }

        let slope = if self.equals(other) {
            let numerator = (BigUint::from(3u32) * &self.x * &self.x + &c.a) % p;
            let denominator = (BigUint::from(2u32) * &self.y) % p;
            (numerator * mod_inverse(&denominator, p)) % p
        } else {
            let numerator = mod_sub(&other.y, &self.y, p);
            let denominator = mod_sub(&other.x, &self.x, p);
            (numerator * mod_inverse(&denominator, p)) % p
        };

        let x_r = mod_sub(&((&slope * &slope) % p), &((&self.x + &other.x) % p), p);
        let y_r = mod_sub(&((slope * mod_sub(&self.x, &x_r, p)) % p), &self.y, p);
        Point {
            x: x_r,
            y: y_r,
            infinity: false,
        }
    }

    /// Binary double-and-add scalar multiplication. A negative scalar
    /// negates the point and multiplies by the magnitude; a zero scalar or
    /// identity base yields the identity. The scalar is used as-is: no
    /// reduction modulo the group order happens here.
    pub fn scalar_mul(&self, scalar: &BigInt) -> Point {
        if self.infinity || scalar.is_zero() {
            return Point::identity();
        }
        if scalar.sign() == Sign::Minus {
            return self.negate().scalar_mul(&-scalar);
        }

        let mut k = scalar.magnitude().clone();
        let mut result = Point::identity();
        let mut addend = self.clone();
        while !k.is_zero() {
            if k.bit(0) {
                result = result.add(&addend);
            }
            addend = addend.add(&addend);
            k >>= 1;
        }
        result
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Point {}

/// Derive the public key point for a private scalar
///
/// The scalar is reduced modulo the group order; a scalar that reduces to
/// zero has no public key and is rejected.
pub fn public_key_from_scalar(private_scalar: &BigUint) -> Result<Point, CryptoError> {
    let c = curve();
    let scalar = private_scalar % &c.n;
    if scalar.is_zero() {
        return Err(CryptoError::InvalidScalar {
            reason: "private scalar reduces to zero".to_string(),
        });
    }
    Ok(c.generator().scalar_mul(&BigInt::from(scalar)))
}

/// Hash an affine point to an integer modulo the group order
///
/// `SHA512(x ‖ y)` over fixed-width big-endian coordinates, reduced mod n.
/// The identity hashes its zeroed coordinate encoding.
pub fn hash_point(point: &Point) -> BigUint {
    let mut material = Vec::with_capacity(POINT_BYTE_LENGTH * 2);
    material.extend_from_slice(&scalar_to_bytes(&point.x));
    material.extend_from_slice(&scalar_to_bytes(&point.y));
    let digest = Sha512::digest(&material);
    BigUint::from_bytes_be(&digest) % &curve().n
}

/// Fixed-width big-endian encoding of a field element or scalar
///
/// Values must already be reduced below `2^192`; anything wider is an
/// internal invariant violation and panics rather than truncating.
pub fn scalar_to_bytes(value: &BigUint) -> [u8; POINT_BYTE_LENGTH] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; POINT_BYTE_LENGTH];
    out[POINT_BYTE_LENGTH - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Multiplicative inverse modulo a prime, via Fermat's little theorem
pub(crate) fn mod_inverse(value: &BigUint, modulus: &BigUint) -> BigUint {
    let reduced = value % modulus;
    reduced.modpow(&(modulus - BigUint::from(2u32)), modulus)
}

/// `(a - b) mod m` without underflow
pub(crate) fn mod_sub(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    ((a % modulus) + modulus - (b % modulus)) % modulus
}

/// Force a value into `[1, modulus-1]`: reduce, then map zero to one
pub(crate) fn normalize_scalar(value: &BigUint, modulus: &BigUint) -> BigUint {
    let reduced = value % modulus;
    if reduced.is_zero() {
        BigUint::one()
    } else {
        reduced
    }
}

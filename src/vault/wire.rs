// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Wire Encoding
//!
//! Serde payload structs and the fixed-width hex conventions the vault
//! speaks to clients:
//!
//! - point coordinates are 48 lowercase hex characters (24 bytes),
//!   zero-padded; the all-zero pair `(0,0)` is the reserved encoding of the
//!   identity element and decodes to it, never to a literal coordinate pair
//! - every other decoded point must lie on the curve (`InvalidPoint`)
//! - signature and proof scalars (`r`, `s`) are emitted as 48 lowercase
//!   hex characters

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::crypto::curve::Point;

use super::error::VaultError;
use super::secrets::{AttestationReceipt, SignatureListing, SignedSecret};
use super::session::HandshakeResult;

/// Emitted width of a coordinate or scalar in hex characters
pub const SCALAR_HEX_WIDTH: usize = 48;

/// Fixed-width lowercase hex rendering of a scalar or coordinate
pub fn scalar_hex(value: &BigUint) -> String {
    format!("{:0>width$}", value.to_str_radix(16), width = SCALAR_HEX_WIDTH)
}

/// Parse a hex scalar field
pub fn parse_scalar_hex(field: &str, raw: &str) -> Result<BigUint, VaultError> {
    BigUint::parse_bytes(raw.trim().as_bytes(), 16)
        .ok_or_else(|| VaultError::InvalidPayload(format!("field '{}' is not valid hex", field)))
}

/// A curve point in wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointWire {
    pub x: String,
    pub y: String,
}

impl PointWire {
    pub fn encode(point: &Point) -> Self {
        PointWire {
            x: scalar_hex(point.x()),
            y: scalar_hex(point.y()),
        }
    }

    /// Decode and validate a wire point
    ///
    /// `(0,0)` is the identity; anything else must be a 48-hex-character
    /// on-curve coordinate pair.
    pub fn decode(&self) -> Result<Point, VaultError> {
        let x = decode_coordinate("x", &self.x)?;
        let y = decode_coordinate("y", &self.y)?;
        if x.is_zero() && y.is_zero() {
            return Ok(Point::identity());
        }
        Ok(Point::from_affine(x, y)?)
    }
}

fn decode_coordinate(field: &str, raw: &str) -> Result<BigUint, VaultError> {
    if raw.len() != SCALAR_HEX_WIDTH {
        return Err(VaultError::InvalidPoint(format!(
            "coordinate '{}' must be {} hex characters, got {}",
            field,
            SCALAR_HEX_WIDTH,
            raw.len()
        )));
    }
    let bytes = hex::decode(raw)
        .map_err(|e| VaultError::InvalidPoint(format!("coordinate '{}': {}", field, e)))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// A Schnorr proof in wire form: commitment point plus response scalar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofWire {
    #[serde(rename = "T")]
    pub commitment: PointWire,
    pub s: String,
}

impl ProofWire {
    pub fn decode(&self) -> Result<(Point, BigUint), VaultError> {
        let commitment = self.commitment.decode()?;
        let s = parse_scalar_hex("s", &self.s)?;
        Ok((commitment, s))
    }
}

/// An ECDSA signature over one secret's digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub secret_id: String,
    pub r: String,
    pub s: String,
    pub digest_hex: String,
}

impl From<&SignedSecret> for SignatureEntry {
    fn from(signed: &SignedSecret) -> Self {
        SignatureEntry {
            secret_id: signed.secret_id.clone(),
            r: scalar_hex(&signed.r),
            s: scalar_hex(&signed.s),
            digest_hex: hex::encode(&signed.digest),
        }
    }
}

/// Response of the `list_signatures` operation, including the signature
/// budget left on the session (`None` when unlimited)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSignaturesResponse {
    pub signatures: Vec<SignatureEntry>,
    pub remaining_budget: Option<u32>,
}

impl From<&SignatureListing> for ListSignaturesResponse {
    fn from(listing: &SignatureListing) -> Self {
        ListSignaturesResponse {
            signatures: listing.signatures.iter().map(SignatureEntry::from).collect(),
            remaining_budget: listing.remaining_budget,
        }
    }
}

/// Handshake request: the caller's static and ephemeral public points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeRequest {
    pub static_pub: PointWire,
    pub ephemeral_pub: PointWire,
}

/// Request body of the `store_secret` operation
///
/// `public_key` is genuinely optional (the self-custody owner label does
/// not need one); it is never an all-zero sentinel. `proof` is accepted for
/// interface symmetry with retrieval but storing does not verify one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSecretRequest {
    pub owner: String,
    pub ciphertext_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PointWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,
}

/// Response of the `store_secret` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSecretResponse {
    pub secret_id: String,
}

/// Request body of the `retrieve_secret` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveSecretRequest {
    pub owner: String,
    pub secret_id: String,
    pub proof: ProofWire,
}

/// Response of the `retrieve_secret` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveSecretResponse {
    pub ciphertext_hex: String,
}

/// Handshake response returned by `create_session`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeResponse {
    pub server_pub: PointWire,
    pub session_pub: PointWire,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&HandshakeResult> for HandshakeResponse {
    fn from(result: &HandshakeResult) -> Self {
        HandshakeResponse {
            server_pub: PointWire::encode(&result.server_public),
            session_pub: PointWire::encode(&result.session_public),
            session_id: result.session_id.clone(),
            expires_at: result.expires_at,
        }
    }
}

/// Schnorr attestation receipt in wire form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationWire {
    #[serde(rename = "R_x")]
    pub r_x: String,
    #[serde(rename = "R_y")]
    pub r_y: String,
    pub s: String,
}

/// Response of the `attest` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestResponse {
    pub owner: String,
    pub hash_hex: String,
    pub attestation: AttestationWire,
}

impl AttestResponse {
    pub fn new(owner: &str, receipt: &AttestationReceipt) -> Self {
        AttestResponse {
            owner: owner.to_string(),
            hash_hex: hex::encode(receipt.hash),
            attestation: AttestationWire {
                r_x: scalar_hex(receipt.commitment.x()),
                r_y: scalar_hex(receipt.commitment.y()),
                s: scalar_hex(&receipt.response),
            },
        }
    }
}

/// Response of the `attestation_key` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationKeyResponse {
    pub public_key: PointWire,
    pub curve: String,
    pub purpose: String,
}

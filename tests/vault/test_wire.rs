//! Wire-format encoding tests

use fabstir_vault_node::crypto::curve::{curve, Point};
use fabstir_vault_node::vault::error::VaultError;
use fabstir_vault_node::vault::secrets::{SignatureListing, SignedSecret};
use fabstir_vault_node::vault::wire::{
    scalar_hex, AttestationWire, ListSignaturesResponse, PointWire, ProofWire, StoreSecretRequest,
    SCALAR_HEX_WIDTH,
};
use num_bigint::BigUint;

#[test]
fn test_point_encoding_is_fixed_width_lowercase() {
    let wire = PointWire::encode(curve().generator());
    assert_eq!(wire.x.len(), SCALAR_HEX_WIDTH);
    assert_eq!(wire.y.len(), SCALAR_HEX_WIDTH);
    assert!(wire.x.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!wire.x.chars().any(|c| c.is_ascii_uppercase()));
    assert!(wire.decode().unwrap().equals(curve().generator()));
}

#[test]
fn test_identity_round_trips_through_zero_pair() {
    let wire = PointWire::encode(&Point::identity());
    assert_eq!(wire.x, "0".repeat(SCALAR_HEX_WIDTH));
    assert_eq!(wire.y, "0".repeat(SCALAR_HEX_WIDTH));
    assert!(wire.decode().unwrap().is_identity());
}

#[test]
fn test_off_curve_pair_rejected() {
    // (0, 0) is reserved for the identity; (0, 1) is simply off-curve
    let wire = PointWire {
        x: "0".repeat(SCALAR_HEX_WIDTH),
        y: format!("{:0>width$}", "1", width = SCALAR_HEX_WIDTH),
    };
    assert!(matches!(wire.decode(), Err(VaultError::InvalidPoint(_))));
}

#[test]
fn test_wrong_width_coordinate_rejected() {
    let good = PointWire::encode(curve().generator());
    let wire = PointWire {
        x: good.x[1..].to_string(),
        y: good.y,
    };
    assert!(matches!(wire.decode(), Err(VaultError::InvalidPoint(_))));
}

#[test]
fn test_scalar_hex_is_zero_padded() {
    assert_eq!(scalar_hex(&BigUint::from(0x2au32)).len(), SCALAR_HEX_WIDTH);
    assert!(scalar_hex(&BigUint::from(0x2au32)).ends_with("2a"));
    assert!(scalar_hex(&BigUint::from(0x2au32)).starts_with('0'));
}

#[test]
fn test_proof_wire_json_shape() {
    let json = serde_json::json!({
        "T": {
            "x": scalar_hex(curve().generator().x()),
            "y": scalar_hex(curve().generator().y()),
        },
        "s": scalar_hex(&BigUint::from(7u32)),
    });
    let proof: ProofWire = serde_json::from_value(json).unwrap();
    let (commitment, s) = proof.decode().unwrap();
    assert!(commitment.equals(curve().generator()));
    assert_eq!(s, BigUint::from(7u32));
}

#[test]
fn test_store_request_optionals_default_to_none() {
    let json = serde_json::json!({
        "owner": "Alice",
        "ciphertext_hex": "00112233",
    });
    let request: StoreSecretRequest = serde_json::from_value(json).unwrap();
    assert!(request.public_key.is_none());
    assert!(request.proof.is_none());
    assert!(request.secret_id.is_none());
}

#[test]
fn test_signature_listing_conversion() {
    let listing = SignatureListing {
        signatures: vec![SignedSecret {
            secret_id: "s1".to_string(),
            r: BigUint::from(0xabcdu32),
            s: BigUint::from(0x1234u32),
            digest: vec![0xde, 0xad],
        }],
        remaining_budget: Some(3),
    };
    let response = ListSignaturesResponse::from(&listing);
    assert_eq!(response.signatures.len(), 1);
    assert_eq!(response.signatures[0].r.len(), SCALAR_HEX_WIDTH);
    assert_eq!(response.signatures[0].digest_hex, "dead");
    assert_eq!(response.remaining_budget, Some(3));
}

#[test]
fn test_attestation_wire_field_names() {
    let wire = AttestationWire {
        r_x: scalar_hex(&BigUint::from(1u32)),
        r_y: scalar_hex(&BigUint::from(2u32)),
        s: scalar_hex(&BigUint::from(3u32)),
    };
    let value = serde_json::to_value(&wire).unwrap();
    assert!(value.get("R_x").is_some());
    assert!(value.get("R_y").is_some());
    assert!(value.get("s").is_some());
}

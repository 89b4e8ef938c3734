//! Schnorr proof soundness tests

use fabstir_vault_node::crypto::curve::{curve, public_key_from_scalar, Point};
use fabstir_vault_node::crypto::schnorr::{compute_challenge, create_proof, verify_proof};
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::One;

fn random_scalar() -> BigUint {
    let mut rng = rand::thread_rng();
    rng.gen_biguint_below(&(&curve().n - BigUint::one())) + BigUint::one()
}

#[test]
fn test_prove_verify_with_matching_context() {
    for _ in 0..5 {
        let secret = random_scalar();
        let nonce = random_scalar();
        let public = public_key_from_scalar(&secret).unwrap();
        let context: [&[u8]; 2] = [b"Alice", b"some-bound-hash"];

        let (commitment, s) = create_proof(&secret, &nonce, &public, &context);
        assert!(verify_proof(&public, &commitment, &s, &context));
    }
}

#[test]
fn test_changed_context_rejected() {
    let secret = random_scalar();
    let nonce = random_scalar();
    let public = public_key_from_scalar(&secret).unwrap();

    let (commitment, s) = create_proof(&secret, &nonce, &public, &[b"Alice"]);
    assert!(!verify_proof(&public, &commitment, &s, &[b"Alicf"]));
    assert!(!verify_proof(&public, &commitment, &s, &[]));
    assert!(!verify_proof(&public, &commitment, &s, &[b"Alice", b"extra"]));
}

#[test]
fn test_wrong_public_point_rejected() {
    let secret = random_scalar();
    let nonce = random_scalar();
    let public = public_key_from_scalar(&secret).unwrap();
    let other = public_key_from_scalar(&random_scalar()).unwrap();

    let (commitment, s) = create_proof(&secret, &nonce, &public, &[b"Alice"]);
    assert!(!verify_proof(&other, &commitment, &s, &[b"Alice"]));
}

#[test]
fn test_tampered_commitment_rejected() {
    let secret = random_scalar();
    let nonce = random_scalar();
    let public = public_key_from_scalar(&secret).unwrap();

    let (commitment, s) = create_proof(&secret, &nonce, &public, &[b"Alice"]);
    let tampered = commitment.add(curve().generator());
    assert!(!verify_proof(&public, &tampered, &s, &[b"Alice"]));
}

#[test]
fn test_tampered_response_rejected() {
    let secret = random_scalar();
    let nonce = random_scalar();
    let public = public_key_from_scalar(&secret).unwrap();

    let (commitment, s) = create_proof(&secret, &nonce, &public, &[b"Alice"]);
    let bad_s = (&s + BigUint::one()) % &curve().n;
    assert!(!verify_proof(&public, &commitment, &bad_s, &[b"Alice"]));
}

#[test]
fn test_challenge_is_nonzero_and_below_order() {
    let public = public_key_from_scalar(&random_scalar()).unwrap();
    let commitment = curve()
        .generator()
        .scalar_mul(&BigInt::from(random_scalar()));
    let challenge = compute_challenge(&public, &commitment, &[b"ctx"]);
    assert!(challenge >= BigUint::one());
    assert!(challenge < curve().n);
}

#[test]
fn test_proof_against_identity_commitment_shape() {
    // A proof whose commitment is the identity still verifies iff the
    // algebra holds; it is not special-cased away.
    let secret = random_scalar();
    let public = public_key_from_scalar(&secret).unwrap();
    let identity = Point::identity();
    let challenge = compute_challenge(&public, &identity, &[b"ctx"]);
    let s = (BigUint::from(0u32) + &challenge * &secret) % &curve().n;
    assert!(verify_proof(&public, &identity, &s, &[b"ctx"]));
}

//! ECDSA round-trip and rejection tests

use fabstir_vault_node::crypto::curve::{curve, public_key_from_scalar};
use fabstir_vault_node::crypto::ecdsa::{sign_digest, verify_signature};
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::RngCore;
use sha2::{Digest, Sha512};

fn random_scalar() -> BigUint {
    let mut rng = rand::thread_rng();
    rng.gen_biguint_below(&(&curve().n - BigUint::one())) + BigUint::one()
}

fn random_digest() -> Vec<u8> {
    let mut raw = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut raw);
    Sha512::digest(raw).to_vec()
}

#[test]
fn test_sign_verify_round_trip() {
    for _ in 0..5 {
        let d = random_scalar();
        let k = random_scalar();
        let digest = random_digest();
        let public = public_key_from_scalar(&d).unwrap();

        let (r, s) = sign_digest(&d, &k, &digest);
        assert!(verify_signature(&public, &r, &s, &digest));
    }
}

#[test]
fn test_signing_is_deterministic() {
    let d = random_scalar();
    let k = random_scalar();
    let digest = random_digest();
    assert_eq!(sign_digest(&d, &k, &digest), sign_digest(&d, &k, &digest));
}

#[test]
fn test_flipped_digest_bit_rejected() {
    let d = random_scalar();
    let k = random_scalar();
    let mut digest = random_digest();
    let public = public_key_from_scalar(&d).unwrap();
    let (r, s) = sign_digest(&d, &k, &digest);

    digest[0] ^= 0x01;
    assert!(!verify_signature(&public, &r, &s, &digest));
}

#[test]
fn test_tampered_signature_rejected() {
    let d = random_scalar();
    let k = random_scalar();
    let digest = random_digest();
    let public = public_key_from_scalar(&d).unwrap();
    let (r, s) = sign_digest(&d, &k, &digest);

    let bad_r = (&r + BigUint::one()) % &curve().n;
    assert!(!verify_signature(&public, &bad_r, &s, &digest));

    let bad_s = (&s + BigUint::one()) % &curve().n;
    assert!(!verify_signature(&public, &r, &bad_s, &digest));
}

#[test]
fn test_out_of_range_values_rejected() {
    let d = random_scalar();
    let k = random_scalar();
    let digest = random_digest();
    let public = public_key_from_scalar(&d).unwrap();
    let (r, s) = sign_digest(&d, &k, &digest);

    let zero = BigUint::from(0u32);
    let n = curve().n.clone();
    assert!(!verify_signature(&public, &zero, &s, &digest));
    assert!(!verify_signature(&public, &r, &zero, &digest));
    assert!(!verify_signature(&public, &n, &s, &digest));
    assert!(!verify_signature(&public, &r, &n, &digest));
}

#[test]
fn test_wrong_public_key_rejected() {
    let d = random_scalar();
    let k = random_scalar();
    let digest = random_digest();
    let (r, s) = sign_digest(&d, &k, &digest);

    let other = public_key_from_scalar(&random_scalar()).unwrap();
    assert!(!verify_signature(&other, &r, &s, &digest));
}

#[test]
fn test_zero_scalar_inputs_are_normalized() {
    // A zero private scalar or nonce is forced to one rather than used
    let zero = BigUint::from(0u32);
    let digest = random_digest();
    let (r, s) = sign_digest(&zero, &zero, &digest);
    let public = public_key_from_scalar(&BigUint::one()).unwrap();
    assert!(verify_signature(&public, &r, &s, &digest));
}

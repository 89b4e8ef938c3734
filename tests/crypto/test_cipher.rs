//! AES-128-ECB session payload cipher tests

use fabstir_vault_node::crypto::cipher::{decrypt_ecb, encrypt_ecb, AES_BLOCK_SIZE};
use rand::RngCore;

#[test]
fn test_encrypt_decrypt_round_trip() {
    let mut key = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut key);

    for len in [0usize, 1, 15, 16, 17, 31, 32, 255] {
        let plaintext: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
        let ciphertext = encrypt_ecb(&key, &plaintext);
        assert_eq!(ciphertext.len() % AES_BLOCK_SIZE, 0);
        let decrypted = decrypt_ecb(&key, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }
}

#[test]
fn test_padding_always_added() {
    let key = [3u8; 16];
    // A full block of input grows by one whole padding block
    assert_eq!(encrypt_ecb(&key, &[0u8; 16]).len(), 32);
    assert_eq!(encrypt_ecb(&key, &[0u8; 15]).len(), 16);
    assert_eq!(encrypt_ecb(&key, b"").len(), 16);
}

#[test]
fn test_non_block_multiple_rejected() {
    let key = [0u8; 16];
    assert!(decrypt_ecb(&key, &[0u8; 1]).is_err());
    assert!(decrypt_ecb(&key, &[0u8; 17]).is_err());
    assert!(decrypt_ecb(&key, &[]).is_err());
}

#[test]
fn test_tampered_ciphertext_detected_or_differs() {
    let key = [5u8; 16];
    let plaintext = b"vault secret payload".to_vec();
    let mut ciphertext = encrypt_ecb(&key, &plaintext);
    // Corrupt the final (padding-carrying) block
    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0xff;
    match decrypt_ecb(&key, &ciphertext) {
        Err(_) => {}
        Ok(out) => assert_ne!(out, plaintext),
    }
}

#[test]
fn test_wrong_key_never_round_trips() {
    let key = [1u8; 16];
    let wrong = [2u8; 16];
    let plaintext = b"attack at dawn".to_vec();
    let ciphertext = encrypt_ecb(&key, &plaintext);
    match decrypt_ecb(&wrong, &ciphertext) {
        Err(_) => {}
        Ok(out) => assert_ne!(out, plaintext),
    }
}

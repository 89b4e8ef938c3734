// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Payload Encryption (AES-128-ECB)
//!
//! The vault protocol encrypts secret payloads with the session's 16-byte
//! AES key in ECB mode with PKCS#7 block padding. ECB is the protocol's
//! wire format, so the mode is assembled here block by block on top of the
//! RustCrypto `aes` block cipher.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use super::error::CryptoError;

/// Session AES key width (AES-128)
pub const AES_KEY_LENGTH: usize = 16;

/// AES block width
pub const AES_BLOCK_SIZE: usize = 16;

/// Encrypt plaintext under a session key: PKCS#7 pad, then ECB per block
pub fn encrypt_ecb(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut buffer = pad_pkcs7(plaintext);
    for chunk in buffer.chunks_exact_mut(AES_BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }
    buffer
}

/// Decrypt ciphertext under a session key and strip PKCS#7 padding
///
/// Fails if the ciphertext is empty or not a whole number of blocks, or if
/// the padding does not verify after decryption (wrong key or tampering).
pub fn decrypt_ecb(key: &[u8; AES_KEY_LENGTH], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidCiphertext {
            reason: format!(
                "length {} is not a positive multiple of the {}-byte block size",
                ciphertext.len(),
                AES_BLOCK_SIZE
            ),
        });
    }

    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut buffer = ciphertext.to_vec();
    for chunk in buffer.chunks_exact_mut(AES_BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
    }
    unpad_pkcs7(buffer)
}

/// PKCS#7: always append 1..=16 padding bytes, each equal to the pad length
fn pad_pkcs7(data: &[u8]) -> Vec<u8> {
    let pad_len = AES_BLOCK_SIZE - (data.len() % AES_BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    padded
}

fn unpad_pkcs7(mut data: Vec<u8>) -> Result<Vec<u8>, CryptoError> {
    let pad_len = *data.last().ok_or(CryptoError::InvalidPadding)? as usize;
    if pad_len == 0 || pad_len > AES_BLOCK_SIZE || pad_len > data.len() {
        return Err(CryptoError::InvalidPadding);
    }
    let boundary = data.len() - pad_len;
    if data[boundary..].iter().any(|&b| b as usize != pad_len) {
        return Err(CryptoError::InvalidPadding);
    }
    data.truncate(boundary);
    Ok(data)
}

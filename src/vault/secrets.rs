// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Secret Operations
//!
//! Store, retrieve, list-and-sign, and attest operations over persisted
//! secrets. Retrieval is gated by a caller-supplied Schnorr proof against
//! the secret's stored public point; signing consumes one EC-LCG nonce per
//! signature under the account's lock; attestation receipts are signed with
//! the attestation scalar, never with any session key.

use std::sync::Arc;

use chrono::Utc;
use num_bigint::BigUint;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;

use crate::config::VaultSettings;
use crate::crypto::curve::{curve, normalize_scalar, scalar_to_bytes, Point};
use crate::crypto::keys::derive_attestation_scalar;
use crate::crypto::{cipher, ecdsa, eclcg::NonceState, public_key_from_scalar, schnorr};

use super::error::VaultError;
use super::session::{point_from_parts, SessionService};
use super::store::{PackedNonceState, SecretRecord, SessionRecord, VaultStore};

/// One ECDSA signature over a secret's SHA-512 digest
#[derive(Debug, Clone)]
pub struct SignedSecret {
    pub secret_id: String,
    pub r: BigUint,
    pub s: BigUint,
    pub digest: Vec<u8>,
}

/// Result of `list_and_sign`: signatures plus the budget left afterwards
/// (`None` when no limit is configured)
#[derive(Debug, Clone)]
pub struct SignatureListing {
    pub signatures: Vec<SignedSecret>,
    pub remaining_budget: Option<u32>,
}

/// A Schnorr attestation receipt over a secret's SHA-256 hash
#[derive(Debug, Clone)]
pub struct AttestationReceipt {
    pub hash: [u8; 32],
    pub commitment: Point,
    pub response: BigUint,
}

/// Secret storage, retrieval, signing, and attestation over a [`VaultStore`]
pub struct SecretService {
    store: Arc<dyn VaultStore>,
    settings: VaultSettings,
    sessions: SessionService,
}

impl SecretService {
    pub fn new(store: Arc<dyn VaultStore>, settings: VaultSettings) -> Self {
        let sessions = SessionService::new(store.clone(), settings.clone());
        SecretService {
            store,
            settings,
            sessions,
        }
    }

    /// Store a write-once secret and return its id
    ///
    /// The ciphertext is decrypted under the caller's session key; the
    /// plaintext is persisted alongside the owner's public point. For the
    /// configured self-custody owner label the server's own public key is
    /// substituted; that owner's secrets are custodied by the server, not
    /// by an external key.
    pub async fn store_secret(
        &self,
        caller: &str,
        session_id: &str,
        owner: &str,
        owner_public: Option<&Point>,
        ciphertext_hex: &str,
        secret_id: Option<String>,
    ) -> Result<String, VaultError> {
        let session = self.sessions.load_active_session(caller, session_id).await?;

        let secret_id = match secret_id {
            Some(id) => id,
            None => generate_secret_id(),
        };

        if self.store.load_secret(owner, &secret_id).await?.is_some() {
            return Err(VaultError::SecretAlreadyExists {
                owner: owner.to_string(),
                secret_id,
            });
        }

        let stored_public = if owner == self.settings.self_owner_label {
            let (_, server_public) = self.sessions.ensure_server_key().await?;
            server_public
        } else {
            owner_public.ok_or(VaultError::PublicKeyRequired)?.clone()
        };

        let plaintext = decrypt_payload(&session, ciphertext_hex)?;

        let record = SecretRecord {
            owner: owner.to_string(),
            secret_id: secret_id.clone(),
            public_x: scalar_to_bytes(stored_public.x()),
            public_y: scalar_to_bytes(stored_public.y()),
            plaintext,
            updated_at: Utc::now(),
        };
        // The insert is the authoritative uniqueness check; the earlier
        // lookup only gives racing callers a friendlier early failure.
        self.store.insert_secret(record).await?;
        debug!(owner, secret_id = %secret_id, "vault secret stored");
        Ok(secret_id)
    }

    /// Retrieve a secret, re-encrypted under the caller's session key
    ///
    /// The caller must prove knowledge of the discrete log of the secret's
    /// stored public point, with the owner label bound into the challenge.
    pub async fn retrieve_secret(
        &self,
        caller: &str,
        session_id: &str,
        owner: &str,
        secret_id: &str,
        proof: (&Point, &BigUint),
    ) -> Result<String, VaultError> {
        let session = self.sessions.load_active_session(caller, session_id).await?;
        let secret = self
            .store
            .load_secret(owner, secret_id)
            .await?
            .ok_or(VaultError::SecretNotFound)?;

        let stored_public = point_from_parts(&secret.public_x, &secret.public_y)?;
        let (commitment, response) = proof;
        let context: [&[u8]; 1] = [owner.as_bytes()];
        if !schnorr::verify_proof(&stored_public, commitment, response, &context) {
            return Err(VaultError::InvalidProof);
        }

        Ok(encrypt_payload(&session, &secret.plaintext))
    }

    /// Sign the SHA-512 digest of every secret for `owner` with the
    /// caller's session scalar, consuming one EC-LCG nonce per signature
    ///
    /// When a signature limit is configured the required count is checked
    /// against the remaining budget up front (`BudgetExhausted`), and the
    /// budget is decremented per signature as the authoritative check.
    pub async fn list_and_sign(
        &self,
        caller: &str,
        session_id: &str,
        owner: &str,
    ) -> Result<SignatureListing, VaultError> {
        let session = self.sessions.load_active_session(caller, session_id).await?;
        let secrets = self.store.list_secrets(owner).await?;

        let limit_enforced = self.settings.session_signature_limit > 0;
        if limit_enforced && secrets.len() as u32 > session.signature_budget {
            return Err(VaultError::BudgetExhausted);
        }

        let session_scalar = BigUint::from_bytes_be(&session.session_scalar);
        let mut signatures = Vec::with_capacity(secrets.len());
        let mut remaining = session.signature_budget;

        for secret in &secrets {
            let digest = Sha512::digest(&secret.plaintext).to_vec();
            let nonce = self.consume_nonce(caller).await?;
            let (r, s) = ecdsa::sign_digest(&session_scalar, &nonce, &digest);
            if limit_enforced {
                remaining = self.store.decrement_session_budget(&session.id).await?;
            }
            signatures.push(SignedSecret {
                secret_id: secret.secret_id.clone(),
                r,
                s,
                digest,
            });
        }

        Ok(SignatureListing {
            signatures,
            remaining_budget: limit_enforced.then_some(remaining),
        })
    }

    /// Produce a Schnorr attestation receipt for the owner's single secret
    ///
    /// Binds `SHA256(plaintext)` and the owner label into the challenge and
    /// signs with the attestation scalar, deliberately distinct from any
    /// session key, so the receipt's authenticity survives session churn.
    pub async fn attest(
        &self,
        caller: &str,
        session_id: &str,
        owner: &str,
    ) -> Result<AttestationReceipt, VaultError> {
        self.sessions.load_active_session(caller, session_id).await?;

        let mut secrets = self.store.list_secrets(owner).await?;
        let secret = match secrets.len() {
            0 => return Err(VaultError::SecretNotFound),
            1 => secrets.remove(0),
            count => {
                return Err(VaultError::Storage(anyhow::anyhow!(
                    "attestation is ambiguous: owner '{}' has {} secrets",
                    owner,
                    count
                )))
            }
        };

        let hash = Sha256::digest(&secret.plaintext);
        let nonce = normalize_scalar(&self.consume_nonce(caller).await?, &curve().n);

        let attestation_scalar = derive_attestation_scalar(&self.settings.manager_secret);
        let attestation_public = public_key_from_scalar(&attestation_scalar)?;
        let context: [&[u8]; 2] = [&hash, owner.as_bytes()];
        let (commitment, response) =
            schnorr::create_proof(&attestation_scalar, &nonce, &attestation_public, &context);

        Ok(AttestationReceipt {
            hash: hash.into(),
            commitment,
            response,
        })
    }

    /// Public verification key for attestation receipts; pure derivation
    pub fn attestation_public_key(&self) -> Result<Point, VaultError> {
        let scalar = derive_attestation_scalar(&self.settings.manager_secret);
        Ok(public_key_from_scalar(&scalar)?)
    }

    /// Advance and persist the caller's EC-LCG state, returning the nonce
    ///
    /// The whole fetch-advance-persist cycle runs under the account's lock:
    /// at most one nonce consumption is in flight per account at a time, so
    /// two concurrent signers can never observe the same state.
    async fn consume_nonce(&self, account: &str) -> Result<BigUint, VaultError> {
        let _guard = self.store.lock_account(account).await;

        let state = match self.store.load_account_state(account).await? {
            Some(packed) => NonceState::unpack(
                &packed.modulus,
                &packed.multiplier,
                &packed.increment,
                &packed.value,
            )?,
            None => NonceState::generate(),
        };

        let (nonce, next_state) = state.advance();
        let [modulus, multiplier, increment, value] = next_state.pack();
        self.store
            .save_account_state(
                account,
                PackedNonceState {
                    modulus,
                    multiplier,
                    increment,
                    value,
                },
            )
            .await?;
        Ok(nonce)
    }
}

/// Random 16-byte lowercase hex identifier
fn generate_secret_id() -> String {
    let mut raw = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut raw);
    hex::encode(raw)
}

fn decrypt_payload(session: &SessionRecord, ciphertext_hex: &str) -> Result<Vec<u8>, VaultError> {
    let ciphertext = hex::decode(ciphertext_hex.trim())
        .map_err(|e| VaultError::InvalidPayload(format!("ciphertext_hex: {}", e)))?;
    Ok(cipher::decrypt_ecb(&session.aes_key, &ciphertext)?)
}

fn encrypt_payload(session: &SessionRecord, plaintext: &[u8]) -> String {
    hex::encode(cipher::encrypt_ecb(&session.aes_key, plaintext))
}

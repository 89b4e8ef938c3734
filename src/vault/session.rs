// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vault Session Establishment
//!
//! Implements the HMQV-style handshake that turns a caller's static and
//! ephemeral public points plus the server's long-term and per-session
//! keys into a shared curve point and a 16-byte AES session key.
//!
//! ## Protocol Flow
//!
//! 1. Ensure the server's long-term key exists (created lazily, persisted)
//! 2. Draw a fresh session scalar `e_s` and compute `E_s = G·e_s`
//! 3. Hash both ephemeral points: `hY = H(E_s)`, `hX = H(client_ephemeral)`
//! 4. Combined scalar `λ = e_s + hY·d_s`, deliberately NOT reduced mod n
//! 5. Combined point `M = client_ephemeral + client_static·hX`
//! 6. Shared point `S = M·λ`; AES key = first 16 bytes of
//!    `SHA512(H(S) as 24-byte big-endian)`
//! 7. Persist the session row and return the public half to the caller
//!
//! Multiple sessions per owner may coexist; callers name one explicitly by
//! id on every subsequent call. There is no "latest session" fallback;
//! picking one implicitly was judged a correctness hazard.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use num_bigint::{BigInt, BigUint};
use sha2::{Digest, Sha512};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::VaultSettings;
use crate::crypto::curve::{curve, hash_point, scalar_to_bytes, Point};
use crate::crypto::keys::{derive_server_scalar, random_scalar};
use crate::crypto::AES_KEY_LENGTH;

use super::error::VaultError;
use super::store::{ServerKeyRecord, SessionRecord, VaultStore};

/// Bundled server response for a completed handshake
#[derive(Debug, Clone)]
pub struct HandshakeResult {
    pub server_public: Point,
    pub session_public: Point,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Session establishment and liveness checks over a [`VaultStore`]
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn VaultStore>,
    settings: VaultSettings,
}

impl SessionService {
    pub fn new(store: Arc<dyn VaultStore>, settings: VaultSettings) -> Self {
        SessionService { store, settings }
    }

    /// Return the server's long-term scalar and public point, creating and
    /// persisting them on first access. Idempotent; concurrent first calls
    /// all observe the same persisted key.
    pub async fn ensure_server_key(&self) -> Result<(BigUint, Point), VaultError> {
        if let Some(record) = self.store.load_server_key().await? {
            return server_key_from_record(&record);
        }

        let scalar = derive_server_scalar(self.settings.server_secret.as_deref());
        let public = crate::crypto::public_key_from_scalar(&scalar)?;
        let record = ServerKeyRecord {
            scalar: scalar_to_bytes(&scalar),
            public_x: scalar_to_bytes(public.x()),
            public_y: scalar_to_bytes(public.y()),
            created_at: Utc::now(),
        };
        let stored = self.store.save_server_key(record).await?;
        info!("🔑 Vault server key created");
        server_key_from_record(&stored)
    }

    /// Perform the handshake and persist a new session for `owner`
    pub async fn create_session(
        &self,
        owner: &str,
        client_pub: &Point,
        client_ephemeral: &Point,
    ) -> Result<HandshakeResult, VaultError> {
        let (server_scalar, server_public) = self.ensure_server_key().await?;

        let session_scalar = random_scalar();
        let session_public = curve()
            .generator()
            .scalar_mul(&BigInt::from(session_scalar.clone()));

        let shared_point = compute_shared_point(
            &server_scalar,
            &session_scalar,
            client_pub,
            client_ephemeral,
            &session_public,
        );
        let aes_key = derive_aes_key(&shared_point);

        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.settings.session_lifetime_secs as i64);
        let session_id = Uuid::new_v4().to_string();

        let record = SessionRecord {
            id: session_id.clone(),
            owner: owner.to_string(),
            client_pub_x: scalar_to_bytes(client_pub.x()),
            client_pub_y: scalar_to_bytes(client_pub.y()),
            client_eph_x: scalar_to_bytes(client_ephemeral.x()),
            client_eph_y: scalar_to_bytes(client_ephemeral.y()),
            session_scalar: scalar_to_bytes(&session_scalar),
            session_pub_x: scalar_to_bytes(session_public.x()),
            session_pub_y: scalar_to_bytes(session_public.y()),
            aes_key,
            signature_budget: self.settings.session_signature_limit,
            expires_at,
            created_at: now,
        };
        self.store.insert_session(record).await?;
        debug!(owner, session_id = %session_id, "vault session established");

        Ok(HandshakeResult {
            server_public,
            session_public,
            session_id,
            expires_at,
        })
    }

    /// Load a session by id for a caller, enforcing ownership and liveness
    ///
    /// An unknown id and an id owned by someone else are the same
    /// `SessionNotFound`; only a session the caller owns can report
    /// `SessionExpired`.
    pub async fn load_active_session(
        &self,
        caller: &str,
        session_id: &str,
    ) -> Result<SessionRecord, VaultError> {
        let record = self
            .store
            .load_session(session_id)
            .await?
            .filter(|record| record.owner == caller)
            .ok_or(VaultError::SessionNotFound)?;
        if record.expires_at < Utc::now() {
            return Err(VaultError::SessionExpired);
        }
        Ok(record)
    }

    /// Storage hygiene: drop sessions whose lifetime has elapsed
    pub async fn purge_expired(&self) -> Result<usize, VaultError> {
        self.store.purge_expired_sessions(Utc::now()).await
    }
}

/// `S = (client_ephemeral + client_static·hX) · (e_s + hY·d_s)`
///
/// The combined scalar is intentionally left unreduced modulo n: the
/// resulting point's order characteristics, not the scalar's value mod n,
/// are what clients interoperate against.
fn compute_shared_point(
    server_scalar: &BigUint,
    session_scalar: &BigUint,
    client_pub: &Point,
    client_ephemeral: &Point,
    session_public: &Point,
) -> Point {
    let hash_y = hash_point(session_public);
    let hash_x = hash_point(client_ephemeral);
    let combined_scalar = session_scalar + hash_y * server_scalar;
    let combined_point = client_ephemeral.add(&client_pub.scalar_mul(&BigInt::from(hash_x)));
    combined_point.scalar_mul(&BigInt::from(combined_scalar))
}

/// First 16 bytes of `SHA512(H(S) as 24-byte big-endian)`
fn derive_aes_key(shared_point: &Point) -> [u8; AES_KEY_LENGTH] {
    let material = scalar_to_bytes(&hash_point(shared_point));
    let digest = Sha512::digest(material);
    let mut key = [0u8; AES_KEY_LENGTH];
    key.copy_from_slice(&digest[..AES_KEY_LENGTH]);
    key
}

fn server_key_from_record(record: &ServerKeyRecord) -> Result<(BigUint, Point), VaultError> {
    let scalar = BigUint::from_bytes_be(&record.scalar);
    let public = point_from_parts(&record.public_x, &record.public_y)?;
    Ok((scalar, public))
}

/// Rebuild a point from stored coordinate bytes; the all-zero pair is the
/// identity, mirroring the wire convention
pub(crate) fn point_from_parts(
    x: &[u8; crate::crypto::POINT_BYTE_LENGTH],
    y: &[u8; crate::crypto::POINT_BYTE_LENGTH],
) -> Result<Point, VaultError> {
    if x.iter().all(|&b| b == 0) && y.iter().all(|&b| b == 0) {
        return Ok(Point::identity());
    }
    Ok(Point::from_affine(
        BigUint::from_bytes_be(x),
        BigUint::from_bytes_be(y),
    )?)
}

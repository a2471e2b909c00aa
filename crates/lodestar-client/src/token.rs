//! RS256 verification of compact `header.payload.signature` tokens.
//!
//! The signature covers the still-encoded `header.payload` text. Both
//! [`verify`] and [`validate_expiry`] run the same check; expiry is only
//! looked at once the signature holds.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use lodestar_core::{Claims, Clock, PublicKey, SystemClock, TokenError};
use rsa::pkcs8::{DecodePublicKey, spki};
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Checks the token signature and returns the decoded payload bytes.
pub fn verify(token: &str, key: &PublicKey) -> Result<Vec<u8>, TokenError> {
    let [header, payload, signature] = split(token)?;
    let public_key = decode_key(key)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::SignatureDecode)?;

    let mut hasher = Sha256::new();
    hasher.update(header.as_bytes());
    hasher.update(b".");
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();

    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
        .map_err(|_| TokenError::SignatureInvalid)?;

    URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| TokenError::ClaimsDecode(err.to_string()))
}

/// Verifies the signature, then rejects tokens whose `exp` is in the past.
pub fn validate_expiry(token: &str, key: &PublicKey) -> Result<Claims, TokenError> {
    validate_expiry_at(token, key, &SystemClock)
}

/// [`validate_expiry`] against an explicit clock. `exp == now` is still valid.
pub fn validate_expiry_at(
    token: &str,
    key: &PublicKey,
    clock: &dyn Clock,
) -> Result<Claims, TokenError> {
    let payload = verify(token, key)?;
    let claims: Claims = serde_json::from_slice(&payload)
        .map_err(|err| TokenError::ClaimsDecode(err.to_string()))?;

    let now = clock.now_secs();
    if claims.exp < now {
        return Err(TokenError::Expired {
            exp: claims.exp,
            now,
        });
    }
    Ok(claims)
}

fn split(token: &str) -> Result<[&str; 3], TokenError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => Err(TokenError::Malformed(token.split('.').count())),
    }
}

fn decode_key(key: &PublicKey) -> Result<RsaPublicKey, TokenError> {
    let der = STANDARD
        .decode(key.as_str())
        .map_err(|err| TokenError::KeyDecode(err.to_string()))?;

    RsaPublicKey::from_public_key_der(&der).map_err(|err| match err {
        spki::Error::OidUnknown { .. } => TokenError::KeyType,
        other => TokenError::KeyDecode(other.to_string()),
    })
}

/// A fetched public key bundled with the clock used for expiry checks.
///
/// Cheap to clone and safe to share between request handlers.
#[derive(Clone)]
pub struct TokenVerifier {
    key: PublicKey,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(key: PublicKey) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    pub fn with_clock(key: PublicKey, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    pub fn verify(&self, token: &str) -> Result<Vec<u8>, TokenError> {
        verify(token, &self.key).inspect_err(|err| {
            debug!(kind = err.kind(), "token signature rejected");
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        validate_expiry_at(token, &self.key, self.clock.as_ref()).inspect_err(|err| {
            debug!(kind = err.kind(), "token rejected");
        })
    }
}

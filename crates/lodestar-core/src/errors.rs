use std::error::Error as StdError;

/// A request that never produced a response body.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(#[source] Box<dyn StdError + Send + Sync>);

impl TransportError {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Errors talking to the registry or the auth service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid service instance: {0}")]
    InvalidInstance(&'static str),

    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response ({reason}): {body}")]
    Decode { reason: String, body: String },

    #[error("auth service returned an empty public key")]
    EmptyKey,

    #[error("auth service rejected the request: {0}")]
    AuthRejected(String),

    #[error("registration rejected: {0}")]
    RegistrationRejected(String),

    #[error("heartbeat rejected: {0}")]
    HeartbeatRejected(String),

    #[error("internal fault: {0}")]
    InternalFault(String),
}

impl RegistryError {
    pub fn decode(reason: impl Into<String>, body: impl Into<String>) -> Self {
        RegistryError::Decode {
            reason: reason.into(),
            body: body.into(),
        }
    }
}

/// Reasons a bearer token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: expected 3 segments, found {0}")]
    Malformed(usize),

    #[error("public key could not be decoded: {0}")]
    KeyDecode(String),

    #[error("public key is not an RSA key")]
    KeyType,

    #[error("signature segment is not valid base64url")]
    SignatureDecode,

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("claims could not be decoded: {0}")]
    ClaimsDecode(String),

    #[error("token expired at {exp} (now {now})")]
    Expired { exp: i64, now: i64 },
}

impl TokenError {
    /// Short name of the failure, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::KeyDecode(_) => "key_decode",
            TokenError::KeyType => "key_type",
            TokenError::SignatureDecode => "signature_decode",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::ClaimsDecode(_) => "claims_decode",
            TokenError::Expired { .. } => "expired",
        }
    }
}

use serde::{Deserialize, Serialize};

/// Claims carried in the payload segment of a bearer token.
///
/// Absent fields take their zero value, so a token without `exp` is
/// already expired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "userId", alias = "userID")]
    pub user_id: String,
    pub exp: i64,
    pub name: String,
}

/// Base64 DER (SubjectPublicKeyInfo) verification key, as handed out by the
/// auth service. Decoding is deferred until a token is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PublicKey {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

use std::sync::Arc;

use lodestar_core::{PublicKey, RegistryError};
use serde_json::{Map, Value};
use tracing::info;

use crate::transport::{FormRequest, Transport};

/// Talks to the authentication service with client credentials.
#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<dyn Transport>,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetches the base64 DER public key used to verify issued tokens.
    ///
    /// The key is not parsed here; a bad key surfaces on first verification.
    pub async fn fetch_public_key(
        &self,
        auth_url: &str,
        client_id: &str,
        secret: &str,
    ) -> Result<PublicKey, RegistryError> {
        let (body, object) = self.exchange(auth_url, client_id, secret).await?;

        match object.get("data") {
            Some(Value::String(key)) if key.is_empty() => Err(RegistryError::EmptyKey),
            Some(Value::String(key)) => {
                info!(auth_url, "fetched auth public key");
                Ok(PublicKey::new(key.as_str()))
            }
            _ => match object.get("error").and_then(Value::as_str) {
                Some(message) => Err(RegistryError::decode(
                    format!("auth service error: {message}"),
                    body,
                )),
                None => Err(RegistryError::decode("`data` is not a string", body)),
            },
        }
    }

    /// Fetches an access token for these client credentials.
    pub async fn fetch_token(
        &self,
        auth_url: &str,
        client_id: &str,
        secret: &str,
    ) -> Result<String, RegistryError> {
        let (body, object) = self.exchange(auth_url, client_id, secret).await?;

        match object.get("error") {
            None | Some(Value::Null) => {}
            Some(Value::String(message)) => {
                return Err(RegistryError::AuthRejected(message.clone()));
            }
            Some(_) => return Err(RegistryError::decode("`error` is not a string", body)),
        }

        match object.get("data") {
            Some(Value::String(token)) => Ok(token.clone()),
            _ => Err(RegistryError::decode("`data` is not a string", body)),
        }
    }

    async fn exchange(
        &self,
        auth_url: &str,
        client_id: &str,
        secret: &str,
    ) -> Result<(String, Map<String, Value>), RegistryError> {
        let request = FormRequest::post(auth_url)
            .param("clientId", client_id)
            .param("secret", secret);

        let body = self.transport.send(request).await?;
        match serde_json::from_str::<Map<String, Value>>(&body) {
            Ok(object) => Ok((body, object)),
            Err(err) => Err(RegistryError::decode(err.to_string(), body)),
        }
    }
}

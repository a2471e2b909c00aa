use std::collections::HashMap;
use std::time::Duration;

use lodestar_core::ServiceInstance;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub url: String,
    pub client_id: String,
    pub secret: String,
}

/// Everything the agent needs, read from `LODESTAR_*` variables.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub center_url: String,
    pub discovery_url: String,
    pub instance: ServiceInstance,
    pub auth: Option<AuthConfig>,
    /// Services resolved once at startup.
    pub lookup: Vec<String>,
    pub http_timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| get(name).filter(|v| !v.is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let center_url = required("LODESTAR_CENTER_URL")?;
        let discovery_url = var("LODESTAR_DISCOVERY_URL")
            .unwrap_or_else(|| format!("{}/list", center_url.trim_end_matches('/')));

        let heartbeat_secs = parse_or("LODESTAR_HEARTBEAT_SECS", var("LODESTAR_HEARTBEAT_SECS"), 5u64)?;
        let mut instance = ServiceInstance::new(
            required("LODESTAR_SERVICE_NAME")?,
            required("LODESTAR_IP")?,
            parse("LODESTAR_PORT", required("LODESTAR_PORT")?)?,
            Duration::from_secs(heartbeat_secs),
        )
        .with_namespace(var("LODESTAR_NAMESPACE").unwrap_or_default())
        .with_cluster(var("LODESTAR_CLUSTER").unwrap_or_default())
        .with_weight(parse_or("LODESTAR_WEIGHT", var("LODESTAR_WEIGHT"), 0)?)
        .enabled(parse_or("LODESTAR_ENABLED", var("LODESTAR_ENABLED"), false)?)
        .healthy(parse_or("LODESTAR_HEALTHY", var("LODESTAR_HEALTHY"), false)?)
        .scheduled(parse_or("LODESTAR_SCHEDULED", var("LODESTAR_SCHEDULED"), false)?);

        if let Some(raw) = var("LODESTAR_METADATA") {
            let metadata: HashMap<String, Value> =
                serde_json::from_str(&raw).map_err(|err| ConfigError::Invalid {
                    name: "LODESTAR_METADATA",
                    reason: err.to_string(),
                })?;
            instance.metadata = metadata;
        }

        let auth = match (
            var("LODESTAR_AUTH_URL"),
            var("LODESTAR_CLIENT_ID"),
            var("LODESTAR_SECRET"),
        ) {
            (None, None, None) => None,
            (Some(url), Some(client_id), Some(secret)) => Some(AuthConfig {
                url,
                client_id,
                secret,
            }),
            _ => {
                return Err(ConfigError::Invalid {
                    name: "LODESTAR_AUTH_URL",
                    reason: "auth url, client id and secret must be set together".to_string(),
                });
            }
        };

        let lookup = var("LODESTAR_LOOKUP")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let http_timeout = Duration::from_secs(parse_or(
            "LODESTAR_HTTP_TIMEOUT_SECS",
            var("LODESTAR_HTTP_TIMEOUT_SECS"),
            10u64,
        )?);

        Ok(Self {
            center_url,
            discovery_url,
            instance,
            auth,
            lookup,
            http_timeout,
        })
    }
}

fn parse<T>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
        name,
        reason: format!("{raw:?}: {err}"),
    })
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse(name, raw),
        None => Ok(default),
    }
}

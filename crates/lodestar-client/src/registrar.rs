use std::sync::Arc;

use lodestar_core::{RegistryError, ServiceInstance};
use tracing::{info, warn};

use crate::heartbeat::{self, HeartbeatHandle};
use crate::transport::{FormRequest, Transport};

/// Bodies the registry answers a successful registration with.
pub const REGISTRATION_ACCEPTED: [&str; 2] = ["ok", "OK"];

/// Registers instances against one registry endpoint.
#[derive(Clone)]
pub struct Registrar {
    transport: Arc<dyn Transport>,
    center_url: String,
}

impl Registrar {
    /// `center_url` is the instance endpoint, e.g.
    /// `http://registry:8848/nacos/v1/ns/instance`.
    pub fn new(transport: Arc<dyn Transport>, center_url: impl Into<String>) -> Self {
        Self {
            transport,
            center_url: center_url.into(),
        }
    }

    pub fn center_url(&self) -> &str {
        &self.center_url
    }

    /// Announces `instance` and starts its heartbeat loop.
    ///
    /// Success only means the registry accepted the instance; later
    /// heartbeat failures are reported through the returned handle.
    pub async fn register(&self, instance: ServiceInstance) -> Result<HeartbeatHandle, RegistryError> {
        if self.center_url.is_empty() {
            return Err(RegistryError::InvalidInstance("center url is empty"));
        }
        instance.validate()?;

        let request = registration_request(&self.center_url, &instance)?;
        let body = self.transport.send(request).await?;
        if !REGISTRATION_ACCEPTED.contains(&body.as_str()) {
            warn!(service = %instance.service_name, %body, "registration rejected");
            return Err(RegistryError::RegistrationRejected(body));
        }

        info!(
            service = %instance.service_name,
            ip = %instance.ip,
            port = instance.port,
            interval = ?instance.heartbeat_interval,
            "instance registered"
        );
        Ok(heartbeat::spawn(
            self.transport.clone(),
            &self.center_url,
            instance,
        ))
    }
}

fn registration_request(
    center_url: &str,
    instance: &ServiceInstance,
) -> Result<FormRequest, RegistryError> {
    let metadata = serde_json::to_string(&instance.metadata).map_err(|source| {
        RegistryError::Encode {
            what: "metadata",
            source,
        }
    })?;

    let mut req = FormRequest::put(center_url)
        .param("ip", instance.ip.as_str())
        .param("port", instance.port.to_string())
        .param("serviceName", instance.service_name.as_str());

    if instance.weight != 0 {
        req = req.param("weight", instance.weight.to_string());
    }
    if instance.enabled {
        req = req.param("enable", "true");
    }
    if instance.healthy {
        req = req.param("healthy", "true");
    }

    req = req.param("metadata", metadata);

    if !instance.cluster_name.is_empty() {
        req = req.param("clusterName", instance.cluster_name.as_str());
    }
    if !instance.namespace_id.is_empty() {
        req = req.param("namespaceId", instance.namespace_id.as_str());
    }

    Ok(req)
}

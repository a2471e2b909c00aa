use std::sync::Arc;

use lodestar_core::{RegistryError, ServiceEndpoint};
use serde::Deserialize;

use crate::transport::{FormRequest, Transport};

/// A missing or `null` host list means no instances.
#[derive(Deserialize)]
struct InstanceList {
    #[serde(default)]
    hosts: Option<Vec<ServiceEndpoint>>,
}

/// Resolves service names to the addresses the registry currently lists.
/// Nothing is cached: every lookup asks the registry again.
#[derive(Clone)]
pub struct ServiceLocator {
    transport: Arc<dyn Transport>,
}

impl ServiceLocator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Instances of `service_name`, in the order the registry returned them.
    pub async fn lookup_endpoints(
        &self,
        service_name: &str,
        discovery_url: &str,
    ) -> Result<Vec<ServiceEndpoint>, RegistryError> {
        let request = FormRequest::get(discovery_url).param("serviceName", service_name);
        let body = self.transport.send(request).await?;

        match serde_json::from_str::<InstanceList>(&body) {
            Ok(list) => Ok(list.hosts.unwrap_or_default()),
            Err(err) => Err(RegistryError::decode(
                format!("instance list: {err}"),
                body,
            )),
        }
    }

    /// Same as [`lookup_endpoints`](Self::lookup_endpoints), flattened to
    /// `ip:port` strings.
    pub async fn lookup(
        &self,
        service_name: &str,
        discovery_url: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let endpoints = self.lookup_endpoints(service_name, discovery_url).await?;
        Ok(endpoints.iter().map(ToString::to_string).collect())
    }
}

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::errors::RegistryError;

/// A service instance as announced to the registry.
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    pub ip: String,
    pub port: u16,
    pub service_name: String,
    pub namespace_id: String,
    /// Sent only when non-zero.
    pub weight: u32,
    pub enabled: bool,
    pub healthy: bool,
    pub metadata: HashMap<String, Value>,
    pub cluster_name: String,
    pub heartbeat_interval: Duration,
    pub scheduled: bool,
}

impl ServiceInstance {
    pub fn new(
        service_name: impl Into<String>,
        ip: impl Into<String>,
        port: u16,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            ip: ip.into(),
            port,
            service_name: service_name.into(),
            namespace_id: String::new(),
            weight: 0,
            enabled: false,
            healthy: false,
            metadata: HashMap::new(),
            cluster_name: String::new(),
            heartbeat_interval,
            scheduled: false,
        }
    }

    pub fn with_namespace(mut self, namespace_id: impl Into<String>) -> Self {
        self.namespace_id = namespace_id.into();
        self
    }

    pub fn with_cluster(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = cluster_name.into();
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn healthy(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn scheduled(mut self, scheduled: bool) -> Self {
        self.scheduled = scheduled;
        self
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Checks the fields the registry cannot do without.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.ip.is_empty() {
            return Err(RegistryError::InvalidInstance("ip is empty"));
        }
        if self.port == 0 {
            return Err(RegistryError::InvalidInstance("port is 0"));
        }
        if self.service_name.is_empty() {
            return Err(RegistryError::InvalidInstance("service name is empty"));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(RegistryError::InvalidInstance("heartbeat interval is 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> ServiceInstance {
        ServiceInstance::new("orders", "10.0.0.5", 8080, Duration::from_secs(5))
    }

    #[test]
    fn complete_instance_is_valid() {
        assert!(instance().validate().is_ok());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let mut no_ip = instance();
        no_ip.ip.clear();
        let mut no_port = instance();
        no_port.port = 0;
        let mut no_name = instance();
        no_name.service_name.clear();
        let mut no_interval = instance();
        no_interval.heartbeat_interval = Duration::ZERO;

        for bad in [no_ip, no_port, no_name, no_interval] {
            assert!(matches!(
                bad.validate(),
                Err(RegistryError::InvalidInstance(_))
            ));
        }
    }

    #[test]
    fn metadata_accepts_any_json_value() {
        let mut inst = instance();
        inst.add_metadata("version", "1.2.0");
        inst.add_metadata("replicas", 3);
        assert_eq!(inst.get_metadata("version"), Some(&Value::from("1.2.0")));
        assert_eq!(inst.get_metadata("replicas"), Some(&Value::from(3)));
        assert_eq!(inst.get_metadata("missing"), None);
    }
}

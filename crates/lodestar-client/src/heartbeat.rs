//! Per-registration heartbeat loop.
//!
//! The loop beats once per interval, starting one interval after
//! registration. The first failure ends it for good: there is no retry, the
//! registry expires the instance on its own.

use std::collections::HashMap;
use std::sync::Arc;

use lodestar_core::{HeartbeatStatus, RegistryError, ServiceInstance};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::transport::{FormRequest, Transport};

/// Bodies the registry answers a successful beat with.
pub const BEAT_ACCEPTED: [&str; 3] = ["ok", "OK", r#"{"clientBeatInterval":5000}"#];

/// Observes and controls one running heartbeat loop.
///
/// Clones share the same loop. Dropping every handle leaves the loop
/// running until it fails.
#[derive(Clone, Debug)]
pub struct HeartbeatHandle {
    status: watch::Receiver<HeartbeatStatus>,
    cancel: CancellationToken,
}

impl HeartbeatHandle {
    pub fn status(&self) -> HeartbeatStatus {
        self.status.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.status.borrow().is_running()
    }

    /// The error that ended the loop, if it failed.
    pub fn last_error(&self) -> Option<Arc<RegistryError>> {
        match &*self.status.borrow() {
            HeartbeatStatus::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Resolves once the loop has stopped or failed.
    pub async fn wait(&self) -> HeartbeatStatus {
        let mut status = self.status.clone();
        match status.wait_for(|s| !s.is_running()).await {
            Ok(terminal) => terminal.clone(),
            Err(_) => HeartbeatStatus::Failed(Arc::new(RegistryError::InternalFault(
                "heartbeat task dropped without reporting".to_string(),
            ))),
        }
    }

    /// Stops beating and waits for the loop to wind down. A loop that
    /// already failed keeps its failure.
    pub async fn stop(&self) -> HeartbeatStatus {
        self.cancel.cancel();
        self.wait().await
    }
}

pub(crate) fn spawn(
    transport: Arc<dyn Transport>,
    center_url: &str,
    instance: ServiceInstance,
) -> HeartbeatHandle {
    let (tx, rx) = watch::channel(HeartbeatStatus::Running);
    let cancel = CancellationToken::new();

    let heartbeat = Heartbeat {
        transport,
        url: format!("{}/beat", center_url.trim_end_matches('/')),
        instance,
    };
    let worker = tokio::spawn(heartbeat.run(cancel.clone()));

    tokio::spawn(async move {
        let status = match worker.await {
            Ok(status) => status,
            Err(err) => {
                let reason = if err.is_panic() {
                    format!("heartbeat task panicked: {err}")
                } else {
                    format!("heartbeat task aborted: {err}")
                };
                error!(%reason, "heartbeat loop ended abnormally");
                HeartbeatStatus::Failed(Arc::new(RegistryError::InternalFault(reason)))
            }
        };
        tx.send_replace(status);
    });

    HeartbeatHandle { status: rx, cancel }
}

struct Heartbeat {
    transport: Arc<dyn Transport>,
    url: String,
    instance: ServiceInstance,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BeatPayload<'a> {
    metadata: &'a HashMap<String, Value>,
    service_name: &'a str,
    ip: &'a str,
    port: u16,
    #[serde(skip_serializing_if = "is_zero")]
    weight: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    cluster: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    scheduled: bool,
}

fn is_zero(weight: &u32) -> bool {
    *weight == 0
}

impl<'a> From<&'a ServiceInstance> for BeatPayload<'a> {
    fn from(instance: &'a ServiceInstance) -> Self {
        Self {
            metadata: &instance.metadata,
            service_name: &instance.service_name,
            ip: &instance.ip,
            port: instance.port,
            weight: instance.weight,
            cluster: &instance.cluster_name,
            scheduled: instance.scheduled,
        }
    }
}

impl Heartbeat {
    async fn run(self, cancel: CancellationToken) -> HeartbeatStatus {
        let period = self.instance.heartbeat_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.stopped(),
                _ = ticker.tick() => {}
            }

            // an in-flight beat is abandoned on cancellation
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.stopped(),
                result = self.beat() => result,
            };

            if let Err(err) = result {
                error!(
                    service = %self.instance.service_name,
                    error = %err,
                    "heartbeat failed, no further beats will be sent"
                );
                return HeartbeatStatus::Failed(Arc::new(err));
            }
        }
    }

    fn stopped(&self) -> HeartbeatStatus {
        info!(service = %self.instance.service_name, "heartbeat stopped");
        HeartbeatStatus::Stopped
    }

    async fn beat(&self) -> Result<(), RegistryError> {
        let payload = serde_json::to_string(&BeatPayload::from(&self.instance)).map_err(
            |source| RegistryError::Encode {
                what: "beat",
                source,
            },
        )?;

        let request = FormRequest::put(self.url.as_str())
            .param("serviceName", self.instance.service_name.as_str())
            .param("beat", payload);

        let body = self.transport.send(request).await?;
        if !BEAT_ACCEPTED.contains(&body.as_str()) {
            return Err(RegistryError::HeartbeatRejected(body));
        }

        debug!(service = %self.instance.service_name, "heartbeat acknowledged");
        Ok(())
    }
}

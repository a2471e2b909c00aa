use std::sync::Arc;

use crate::errors::RegistryError;

/// Lifecycle of a registration's heartbeat loop.
///
/// `Running` is the only non-terminal state; a loop never leaves `Stopped`
/// or `Failed`.
#[derive(Debug, Clone)]
pub enum HeartbeatStatus {
    Running,
    /// Cancelled through its handle.
    Stopped,
    /// The first failed beat, kept for inspection.
    Failed(Arc<RegistryError>),
}

impl HeartbeatStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, HeartbeatStatus::Running)
    }

    pub fn error(&self) -> Option<&RegistryError> {
        match self {
            HeartbeatStatus::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

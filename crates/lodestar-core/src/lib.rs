pub mod auth;
pub mod endpoint;
pub mod errors;
pub mod health;
pub mod instance;
pub mod time;

pub use auth::{Claims, PublicKey};
pub use endpoint::ServiceEndpoint;
pub use errors::{RegistryError, TokenError, TransportError};
pub use health::HeartbeatStatus;
pub use instance::ServiceInstance;
pub use time::{Clock, SystemClock};

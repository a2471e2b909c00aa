//! Client side of a Nacos-style naming registry plus bearer token checks.
//!
//! [`Registrar`] announces an instance and keeps it alive through a
//! [`HeartbeatHandle`]; [`ServiceLocator`] resolves service names to
//! addresses; [`AuthClient`] fetches the auth service's public key that
//! [`TokenVerifier`] checks RS256 tokens against.

pub mod auth;
pub mod heartbeat;
pub mod locator;
pub mod registrar;
pub mod token;
pub mod transport;

pub use auth::AuthClient;
pub use heartbeat::HeartbeatHandle;
pub use locator::ServiceLocator;
pub use registrar::Registrar;
pub use token::{TokenVerifier, validate_expiry, validate_expiry_at, verify};
pub use transport::{FormRequest, Method, ReqwestTransport, Transport};

//! Security Gateway Library

pub mod audit;
pub mod config;
pub mod credential;
pub mod crypto;
pub mod gatekeeper;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;

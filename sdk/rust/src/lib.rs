//! Rust client SDK for the Security Gateway.

pub mod client;

pub use client::GatewayClient;

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests →
//!     Background tasks exit → Process ends
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans the shutdown signal out to the server
//!   and every background task
//! - In-memory security state (rate windows, lockouts) is deliberately
//!   not persisted across restarts

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

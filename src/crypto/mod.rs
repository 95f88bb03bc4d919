//! Symmetric encryption subsystem.
//!
//! # Data Flow
//! ```text
//! issue:    payload {resourcePath, expiresAt}
//!     → token.rs (canonical JSON bytes)
//!     → service.rs (AES-256-GCM, fresh nonce)
//!     → hex(nonce ‖ ciphertext ‖ tag), the opaque access token
//!
//! validate: token string
//!     → service.rs (decode, decrypt, verify tag)
//!     → token.rs (parse payload, check expiry)
//!     → Some(resourcePath) | None
//! ```
//!
//! # Design Decisions
//! - Expiry is bound into the ciphertext, so any process holding the
//!   key can validate a token statelessly
//! - Every decrypt failure produces the same error text; callers can
//!   never distinguish tag mismatch from truncation or a wrong key
//! - Key material is loaded once and immutable for the process
//!   lifetime; there is no rotation

pub mod service;
pub mod token;

pub use service::{CryptoError, EncryptionService};
pub use token::AccessTokenPayload;

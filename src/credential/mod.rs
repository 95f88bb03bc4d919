//! Credential guard subsystem.
//!
//! # Data Flow
//! ```text
//! Login flow (handler or caller owning authentication):
//!     → lockout.rs check   (is this account locked right now?)
//!     → on failed auth:    lockout.rs track_failure
//!     → on success:        lockout.rs reset
//!
//! Signup / password change:
//!     → password.rs validate_password_strength
//!
//! Background:
//!     → lockout.rs sweeper (prunes records the lazy path never reads)
//! ```
//!
//! # Design Decisions
//! - Both checks are pure over the record map plus current time; no
//!   network I/O, so they are never a bottleneck
//! - Lockout responses never reveal whether an account exists
//! - Records live in process memory; a restart clears all lockouts

pub mod lockout;
pub mod password;

pub use lockout::{LockoutStatus, LockoutTracker};
pub use password::{validate_password_strength, PasswordVerdict};

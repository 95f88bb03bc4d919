//! Request gatekeeper subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (fixed-window check per client identifier)
//!         → over budget: 429, audited, done
//!     → routes.rs (public allow-list classification)
//!     → bearer.rs (token validation, protected routes only)
//!         → invalid: 401, audited, done
//!     → inner handler runs
//!     → audit entry for the final outcome
//! ```
//!
//! # Design Decisions
//! - The sequence Rate → Auth → Handle → Log is strict per request;
//!   there is no reordering or speculative execution
//! - Rate and lockout state is process-local; a restart resets it
//! - Every terminal branch writes exactly one audit entry

pub mod bearer;
pub mod gate;
pub mod rate_limit;
pub mod routes;

pub use bearer::{extract_bearer, TokenValidation, TokenValidator};
pub use gate::{secure_request, AuthContext, GateState};
pub use rate_limit::RateLimiter;
pub use routes::RouteTable;

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream call fails:
//!     → backoff.rs (compute jittered delay for the next attempt)
//!     → caller sleeps, then retries within its own attempt budget
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//!   (enforced by the shared HTTP client, see `upstream`)
//! - Jittered backoff prevents synchronized retry bursts
//! - Retry budgets live at the call site; this module only paces them

pub mod backoff;

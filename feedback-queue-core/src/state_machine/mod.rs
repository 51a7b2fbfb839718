//! Explicit state machine for the feedback review lifecycle.
//!
//! The design separates:
//! - **State**: where an entry is (`FeedbackStatus`) and which gates it owes (`RiskLevel`)
//! - **Actions**: what a reviewer asked for (`ReviewAction`)
//! - **Transition**: pure function `(status, risk, action) -> status | RejectionReason`
//!
//! Persistence and lookups live in the service crate; nothing here does I/O.

pub mod action;
pub mod state;
pub mod transition;

pub use action::*;
pub use state::*;
pub use transition::*;

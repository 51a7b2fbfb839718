//! Domain model for the rule feedback queue.
//!
//! Pure types and functions only: the review state machine, the feedback
//! entry aggregate, query filters and business errors. Storage and
//! orchestration live in `feedback-queue-service`.

pub mod entry;
pub mod error;
pub mod query;
pub mod state_machine;

pub use entry::*;
pub use error::ReviewError;
pub use query::*;
pub use state_machine::{
    can_merge, next_status, FeedbackStatus, RejectionReason, ReviewAction, RiskLevel,
};

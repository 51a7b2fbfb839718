//! Business errors for the feedback review workflow.
//!
//! These are caller errors, not transient faults: none of them is ever
//! retried automatically.

use crate::entry::FeedbackId;
use crate::state_machine::{FeedbackStatus, RejectionReason, ReviewAction};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    /// The referenced entry does not exist.
    #[error("feedback {id} not found")]
    NotFound { id: FeedbackId },

    /// The action is not legal from the entry's current `(status, risk_level)`.
    #[error(
        "cannot {action} feedback {} in status {status}: {reason}",
        describe_id(.id)
    )]
    InvalidTransition {
        id: Option<FeedbackId>,
        status: FeedbackStatus,
        action: ReviewAction,
        reason: RejectionReason,
    },

    /// Malformed input, rejected before anything is written.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
}

fn describe_id(id: &Option<FeedbackId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "(unsaved)".to_string(),
    }
}

impl ReviewError {
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

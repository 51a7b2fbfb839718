//! Pure transition table.
//!
//! `next_status` is the whole state machine: given the current status, the
//! entry's risk level and a requested action, it returns the resulting
//! status or the reason the action is not allowed. It has no side effects.

use serde::Serialize;
use std::fmt;

use super::action::ReviewAction;
use super::state::{FeedbackStatus, RiskLevel};

/// Why a requested action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The entry is in a terminal status.
    Terminal,
    /// The action is never legal from the current status.
    NotPermittedFromStatus,
    /// SAFE entries skip the human gate entirely.
    HumanReviewNotRequired,
    /// MEDIUM entries must be human-approved before merge.
    HumanApprovalRequired,
    /// HIGH entries have no path through the queue past the LLM gate.
    ManualMergeOnly,
    /// Another writer changed the entry between read and write. Never
    /// produced by `next_status`.
    ConcurrentUpdate,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal => write!(f, "entry is in a terminal status"),
            Self::NotPermittedFromStatus => write!(f, "action is not permitted from this status"),
            Self::HumanReviewNotRequired => {
                write!(f, "SAFE risk level does not take human review")
            }
            Self::HumanApprovalRequired => {
                write!(f, "MEDIUM risk level requires human approval first")
            }
            Self::ManualMergeOnly => {
                write!(f, "HIGH risk level cannot be merged through the queue")
            }
            Self::ConcurrentUpdate => write!(f, "entry was changed by a concurrent review"),
        }
    }
}

/// Gate for the two human review actions.
fn human_gate(risk_level: RiskLevel) -> Result<(), RejectionReason> {
    match risk_level {
        RiskLevel::Medium => Ok(()),
        RiskLevel::Safe => Err(RejectionReason::HumanReviewNotRequired),
        RiskLevel::High => Err(RejectionReason::ManualMergeOnly),
    }
}

/// Resolve `(status, action)` under the given risk level.
///
/// | status         | action        | risk   | result         |
/// |----------------|---------------|--------|----------------|
/// | PENDING        | LLM_APPROVE   | any    | LLM_APPROVED   |
/// | PENDING        | LLM_REJECT    | any    | LLM_REJECTED   |
/// | LLM_APPROVED   | HUMAN_APPROVE | MEDIUM | HUMAN_APPROVED |
/// | LLM_APPROVED   | HUMAN_REJECT  | MEDIUM | HUMAN_REJECTED |
/// | LLM_APPROVED   | MERGE         | SAFE   | MERGED         |
/// | HUMAN_APPROVED | MERGE         | MEDIUM | MERGED         |
///
/// Every other combination is refused.
pub fn next_status(
    status: FeedbackStatus,
    risk_level: RiskLevel,
    action: ReviewAction,
) -> Result<FeedbackStatus, RejectionReason> {
    use FeedbackStatus as S;
    use ReviewAction as A;

    match (status, action) {
        (S::Pending, A::LlmApprove) => Ok(S::LlmApproved),
        (S::Pending, A::LlmReject) => Ok(S::LlmRejected),
        (S::Pending, A::HumanApprove | A::HumanReject | A::Merge) => {
            Err(RejectionReason::NotPermittedFromStatus)
        }

        (S::LlmApproved, A::HumanApprove) => human_gate(risk_level).map(|()| S::HumanApproved),
        (S::LlmApproved, A::HumanReject) => human_gate(risk_level).map(|()| S::HumanRejected),
        (S::LlmApproved, A::Merge) => match risk_level {
            RiskLevel::Safe => Ok(S::Merged),
            RiskLevel::Medium => Err(RejectionReason::HumanApprovalRequired),
            RiskLevel::High => Err(RejectionReason::ManualMergeOnly),
        },
        (S::LlmApproved, A::LlmApprove | A::LlmReject) => {
            Err(RejectionReason::NotPermittedFromStatus)
        }

        (S::HumanApproved, A::Merge) => match risk_level {
            RiskLevel::Medium => Ok(S::Merged),
            RiskLevel::Safe => Err(RejectionReason::NotPermittedFromStatus),
            RiskLevel::High => Err(RejectionReason::ManualMergeOnly),
        },
        (S::HumanApproved, A::LlmApprove | A::LlmReject | A::HumanApprove | A::HumanReject) => {
            Err(RejectionReason::NotPermittedFromStatus)
        }

        (S::LlmRejected | S::HumanRejected | S::Merged, _) => Err(RejectionReason::Terminal),
    }
}

/// Returns true if `merge` is legal for this `(status, risk_level)` pair.
pub fn can_merge(status: FeedbackStatus, risk_level: RiskLevel) -> bool {
    next_status(status, risk_level, ReviewAction::Merge).is_ok()
}

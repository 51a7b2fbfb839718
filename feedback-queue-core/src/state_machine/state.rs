//! Status and risk-level types for the feedback review state machine.
//!
//! Status is the only thing that moves. Risk level is fixed at submission
//! and acts as a routing key for which gates an entry must pass; it is never
//! folded into the status itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;

/// Where a feedback entry sits in its review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackStatus {
    /// Submitted, waiting for the LLM gate.
    Pending,
    /// Passed the LLM gate.
    LlmApproved,
    /// Rejected by the LLM gate (terminal).
    LlmRejected,
    /// Passed the human gate (MEDIUM risk only).
    HumanApproved,
    /// Rejected by a human reviewer (terminal).
    HumanRejected,
    /// Certified for merge into the target catalog (terminal).
    Merged,
}

impl FeedbackStatus {
    pub const ALL: [FeedbackStatus; 6] = [
        Self::Pending,
        Self::LlmApproved,
        Self::LlmRejected,
        Self::HumanApproved,
        Self::HumanRejected,
        Self::Merged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::LlmApproved => "LLM_APPROVED",
            Self::LlmRejected => "LLM_REJECTED",
            Self::HumanApproved => "HUMAN_APPROVED",
            Self::HumanRejected => "HUMAN_REJECTED",
            Self::Merged => "MERGED",
        }
    }

    /// Returns true if no transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::LlmRejected | Self::HumanRejected | Self::Merged
        )
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ReviewError::invalid_argument("status", format!("unknown status '{}'", s)))
    }
}

/// How much independent verification a proposed change needs.
///
/// Assigned once at submission by an external classifier and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// LLM approval alone is enough to merge.
    Safe,
    /// Needs a human approval after the LLM gate.
    Medium,
    /// Never merged through the queue.
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Safe, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// SAFE entries merge straight after the LLM gate.
    pub fn is_auto_mergeable(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// MEDIUM entries must pass the human gate before merge.
    pub fn requires_human_approval(&self) -> bool {
        matches!(self, Self::Medium)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| {
                ReviewError::invalid_argument("risk_level", format!("unknown risk level '{}'", s))
            })
    }
}

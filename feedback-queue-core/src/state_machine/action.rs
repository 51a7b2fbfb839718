//! Actions a reviewer (automated or human) can request on an entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;

/// A requested review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    LlmApprove,
    LlmReject,
    HumanApprove,
    HumanReject,
    Merge,
}

impl ReviewAction {
    pub const ALL: [ReviewAction; 5] = [
        Self::LlmApprove,
        Self::LlmReject,
        Self::HumanApprove,
        Self::HumanReject,
        Self::Merge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LlmApprove => "LLM_APPROVE",
            Self::LlmReject => "LLM_REJECT",
            Self::HumanApprove => "HUMAN_APPROVE",
            Self::HumanReject => "HUMAN_REJECT",
            Self::Merge => "MERGE",
        }
    }

    /// Returns true for the two human gate actions.
    pub fn is_human_review(&self) -> bool {
        matches!(self, Self::HumanApprove | Self::HumanReject)
    }

    /// Returns true for actions produced by the LLM gate.
    pub fn is_llm_review(&self) -> bool {
        matches!(self, Self::LlmApprove | Self::LlmReject)
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewAction {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ReviewError::invalid_argument("action", format!("unknown action '{}'", s)))
    }
}

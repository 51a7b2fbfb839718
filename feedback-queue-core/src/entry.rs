//! The feedback entry aggregate and its value types.
//!
//! An entry is a single proposed correction to the rule knowledge base. It is
//! created in `PENDING` and only ever changes through [`FeedbackEntry::apply`],
//! which runs the transition table and returns a new value; nothing mutates
//! status or risk level in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;
use crate::state_machine::{next_status, FeedbackStatus, ReviewAction, RiskLevel};

/// Maximum length of review notes, in characters.
pub const MAX_REVIEW_NOTES_LEN: usize = 1000;

/// Newtype for a feedback entry ID, assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(pub u64);

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FeedbackId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for FeedbackId {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(ReviewError::invalid_argument(
                "id",
                format!("'{}' is not a positive integer", s),
            )),
            Ok(id) => Ok(Self(id)),
        }
    }
}

/// Newtype for the ID of the corrected record in its own catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Kind of catalog record a feedback entry proposes to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    CodingRule,
    RuleExample,
    ClassTemplate,
    ChecklistItem,
    ArchUnitTest,
}

impl TargetType {
    pub const ALL: [TargetType; 5] = [
        Self::CodingRule,
        Self::RuleExample,
        Self::ClassTemplate,
        Self::ChecklistItem,
        Self::ArchUnitTest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodingRule => "CODING_RULE",
            Self::RuleExample => "RULE_EXAMPLE",
            Self::ClassTemplate => "CLASS_TEMPLATE",
            Self::ChecklistItem => "CHECKLIST_ITEM",
            Self::ArchUnitTest => "ARCH_UNIT_TEST",
        }
    }

    /// Risk level used when the submitter supplies no classifier verdict.
    ///
    /// Examples and checklist items are additive and low impact; rules,
    /// templates and architecture tests change what generated code looks like.
    pub fn default_risk_level(&self) -> RiskLevel {
        match self {
            Self::RuleExample | Self::ChecklistItem => RiskLevel::Safe,
            Self::CodingRule | Self::ClassTemplate | Self::ArchUnitTest => RiskLevel::Medium,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                ReviewError::invalid_argument("target_type", format!("unknown target type '{}'", s))
            })
    }
}

/// Kind of change requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
    Add,
    Modify,
    Delete,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 3] = [Self::Add, Self::Modify, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Modify => "MODIFY",
            Self::Delete => "DELETE",
        }
    }

    /// MODIFY and DELETE must name the record they touch.
    pub fn requires_target_id(&self) -> bool {
        !matches!(self, Self::Add)
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackType {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                ReviewError::invalid_argument(
                    "feedback_type",
                    format!("unknown feedback type '{}'", s),
                )
            })
    }
}

/// Opaque serialized description of the proposed change.
///
/// Only its presence is checked; the contents are never parsed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedbackPayload(String);

impl FeedbackPayload {
    pub fn new(payload: impl Into<String>) -> Result<Self, ReviewError> {
        let payload = payload.into();
        if payload.trim().is_empty() {
            return Err(ReviewError::invalid_argument(
                "payload",
                "payload must not be blank",
            ));
        }
        Ok(Self(payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FeedbackPayload {
    type Error = ReviewError;

    fn try_from(payload: String) -> Result<Self, Self::Error> {
        Self::new(payload)
    }
}

impl From<FeedbackPayload> for String {
    fn from(payload: FeedbackPayload) -> Self {
        payload.0
    }
}

/// Free-text rationale attached by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewNotes(String);

impl ReviewNotes {
    /// Returns `Ok(None)` for blank input; over-long notes are rejected.
    pub fn parse(notes: Option<String>) -> Result<Option<Self>, ReviewError> {
        let Some(notes) = notes else {
            return Ok(None);
        };
        if notes.trim().is_empty() {
            return Ok(None);
        }
        let len = notes.chars().count();
        if len > MAX_REVIEW_NOTES_LEN {
            return Err(ReviewError::invalid_argument(
                "review_notes",
                format!(
                    "review notes are {} characters, limit is {}",
                    len, MAX_REVIEW_NOTES_LEN
                ),
            ));
        }
        Ok(Some(Self(notes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A present value must be real notes; absence is spelled `None`.
impl TryFrom<String> for ReviewNotes {
    type Error = ReviewError;

    fn try_from(notes: String) -> Result<Self, Self::Error> {
        Self::parse(Some(notes))?.ok_or_else(|| {
            ReviewError::invalid_argument("review_notes", "review notes must not be blank")
        })
    }
}

impl From<ReviewNotes> for String {
    fn from(notes: ReviewNotes) -> Self {
        notes.0
    }
}

impl fmt::Display for ReviewNotes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated submission, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    target_type: TargetType,
    target_id: Option<TargetId>,
    feedback_type: FeedbackType,
    payload: FeedbackPayload,
    risk_level: RiskLevel,
}

impl NewFeedback {
    /// Build a submission with an explicit classifier verdict.
    pub fn new(
        target_type: TargetType,
        target_id: Option<TargetId>,
        feedback_type: FeedbackType,
        payload: FeedbackPayload,
        risk_level: RiskLevel,
    ) -> Result<Self, ReviewError> {
        if feedback_type.requires_target_id() && target_id.is_none() {
            return Err(ReviewError::invalid_argument(
                "target_id",
                format!("target_id is required for {} feedback", feedback_type),
            ));
        }
        Ok(Self {
            target_type,
            target_id,
            feedback_type,
            payload,
            risk_level,
        })
    }

    /// Build a submission using the target type's default risk level.
    pub fn with_default_risk(
        target_type: TargetType,
        target_id: Option<TargetId>,
        feedback_type: FeedbackType,
        payload: FeedbackPayload,
    ) -> Result<Self, ReviewError> {
        Self::new(
            target_type,
            target_id,
            feedback_type,
            payload,
            target_type.default_risk_level(),
        )
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Materialize as an unsaved `PENDING` entry.
    pub fn into_entry(self, now: DateTime<Utc>) -> FeedbackEntry {
        FeedbackEntry {
            id: None,
            target_type: self.target_type,
            target_id: self.target_id,
            feedback_type: self.feedback_type,
            payload: self.payload,
            status: FeedbackStatus::Pending,
            risk_level: self.risk_level,
            review_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Every stored column of an entry, used by repositories to rebuild one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub target_type: TargetType,
    pub target_id: Option<TargetId>,
    pub feedback_type: FeedbackType,
    pub payload: FeedbackPayload,
    pub status: FeedbackStatus,
    pub risk_level: RiskLevel,
    pub review_notes: Option<ReviewNotes>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate root: one proposed correction under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    id: Option<FeedbackId>,
    target_type: TargetType,
    target_id: Option<TargetId>,
    feedback_type: FeedbackType,
    payload: FeedbackPayload,
    status: FeedbackStatus,
    risk_level: RiskLevel,
    review_notes: Option<ReviewNotes>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FeedbackRecord> for FeedbackEntry {
    fn from(record: FeedbackRecord) -> Self {
        Self {
            id: Some(record.id),
            target_type: record.target_type,
            target_id: record.target_id,
            feedback_type: record.feedback_type,
            payload: record.payload,
            status: record.status,
            risk_level: record.risk_level,
            review_notes: record.review_notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl FeedbackEntry {
    pub fn id(&self) -> Option<FeedbackId> {
        self.id
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn target_id(&self) -> Option<TargetId> {
        self.target_id
    }

    pub fn feedback_type(&self) -> FeedbackType {
        self.feedback_type
    }

    pub fn payload(&self) -> &FeedbackPayload {
        &self.payload
    }

    pub fn status(&self) -> FeedbackStatus {
        self.status
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn review_notes(&self) -> Option<&ReviewNotes> {
        self.review_notes.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true until the store has assigned an ID.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// LLM-approved SAFE entry: can merge without a human.
    pub fn can_auto_merge(&self) -> bool {
        self.status == FeedbackStatus::LlmApproved && self.risk_level.is_auto_mergeable()
    }

    /// LLM-approved MEDIUM entry: waiting on the human gate.
    pub fn requires_human_review(&self) -> bool {
        self.status == FeedbackStatus::LlmApproved && self.risk_level.requires_human_approval()
    }

    /// Record the ID assigned by the store. Only valid once.
    pub fn assign_id(&mut self, id: FeedbackId) -> Result<(), ReviewError> {
        if let Some(existing) = self.id {
            return Err(ReviewError::invalid_argument(
                "id",
                format!("id already assigned ({})", existing),
            ));
        }
        self.id = Some(id);
        Ok(())
    }

    /// Check `action` against the transition table without building a new value.
    pub fn check(&self, action: ReviewAction) -> Result<FeedbackStatus, ReviewError> {
        next_status(self.status, self.risk_level, action).map_err(|reason| {
            ReviewError::InvalidTransition {
                id: self.id,
                status: self.status,
                action,
                reason,
            }
        })
    }

    /// Apply `action`, returning the entry as it should be persisted.
    ///
    /// LLM decisions replace the notes (absent notes clear them). Human
    /// decisions and merges keep the previous notes unless new ones are given.
    pub fn apply(
        &self,
        action: ReviewAction,
        notes: Option<ReviewNotes>,
        now: DateTime<Utc>,
    ) -> Result<FeedbackEntry, ReviewError> {
        let status = self.check(action)?;

        let review_notes = if action.is_llm_review() {
            notes
        } else {
            notes.or_else(|| self.review_notes.clone())
        };

        Ok(FeedbackEntry {
            status,
            review_notes,
            updated_at: now,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap()
    }

    fn later(secs: i64) -> DateTime<Utc> {
        now() + chrono::Duration::seconds(secs)
    }

    fn payload(s: &str) -> FeedbackPayload {
        FeedbackPayload::new(s).unwrap()
    }

    fn notes(s: &str) -> Option<ReviewNotes> {
        ReviewNotes::parse(Some(s.to_string())).unwrap()
    }

    fn pending(risk_level: RiskLevel) -> FeedbackEntry {
        let mut entry = NewFeedback::new(
            TargetType::RuleExample,
            None,
            FeedbackType::Add,
            payload(r#"{"code": "example"}"#),
            risk_level,
        )
        .unwrap()
        .into_entry(now());
        entry.assign_id(FeedbackId(1)).unwrap();
        entry
    }

    #[test]
    fn test_new_entry_is_pending_and_unsaved() {
        let entry = NewFeedback::with_default_risk(
            TargetType::RuleExample,
            None,
            FeedbackType::Add,
            payload(r#"{"code": "test"}"#),
        )
        .unwrap()
        .into_entry(now());

        assert!(entry.is_new());
        assert_eq!(entry.status(), FeedbackStatus::Pending);
        assert_eq!(entry.risk_level(), RiskLevel::Safe);
        assert_eq!(entry.created_at(), entry.updated_at());
        assert!(entry.review_notes().is_none());
    }

    #[test]
    fn test_coding_rule_defaults_to_medium() {
        let new = NewFeedback::with_default_risk(
            TargetType::CodingRule,
            None,
            FeedbackType::Add,
            payload(r#"{"rule": "test"}"#),
        )
        .unwrap();
        assert_eq!(new.risk_level(), RiskLevel::Medium);
    }

    #[test]
    fn test_explicit_risk_overrides_default() {
        let new = NewFeedback::new(
            TargetType::RuleExample,
            None,
            FeedbackType::Add,
            payload("{}"),
            RiskLevel::High,
        )
        .unwrap();
        assert_eq!(new.risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_modify_and_delete_require_target_id() {
        for feedback_type in [FeedbackType::Modify, FeedbackType::Delete] {
            let err = NewFeedback::with_default_risk(
                TargetType::ChecklistItem,
                None,
                feedback_type,
                payload(r#"{"reason": "obsolete"}"#),
            )
            .unwrap_err();
            assert!(err.to_string().contains("target_id is required"));
        }

        assert!(NewFeedback::with_default_risk(
            TargetType::ChecklistItem,
            Some(TargetId(9)),
            FeedbackType::Delete,
            payload(r#"{"reason": "obsolete"}"#),
        )
        .is_ok());
    }

    #[test]
    fn test_blank_payload_rejected() {
        for blank in ["", "   ", "\n\t"] {
            let err = FeedbackPayload::new(blank).unwrap_err();
            assert!(matches!(
                err,
                ReviewError::InvalidArgument {
                    field: "payload",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_payload_is_kept_verbatim() {
        let p = payload("  not even json  ");
        assert_eq!(p.as_str(), "  not even json  ");
    }

    #[test]
    fn test_review_notes_parse() {
        assert_eq!(ReviewNotes::parse(None).unwrap(), None);
        assert_eq!(ReviewNotes::parse(Some("  ".into())).unwrap(), None);
        assert_eq!(
            ReviewNotes::parse(Some("ok".into())).unwrap().unwrap().as_str(),
            "ok"
        );

        let too_long = "x".repeat(MAX_REVIEW_NOTES_LEN + 1);
        assert!(ReviewNotes::parse(Some(too_long)).is_err());
        let at_limit = "x".repeat(MAX_REVIEW_NOTES_LEN);
        assert!(ReviewNotes::parse(Some(at_limit)).unwrap().is_some());
    }

    #[test]
    fn test_deserialize_runs_payload_validation() {
        let err = serde_json::from_str::<FeedbackPayload>(r#""   ""#).unwrap_err();
        assert!(err.to_string().contains("payload must not be blank"));

        let p: FeedbackPayload = serde_json::from_str(r#""{\"code\": 1}""#).unwrap();
        assert_eq!(p.as_str(), r#"{"code": 1}"#);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#""{\"code\": 1}""#);
    }

    #[test]
    fn test_deserialize_runs_notes_validation() {
        let too_long = format!("\"{}\"", "x".repeat(5000));
        let err = serde_json::from_str::<ReviewNotes>(&too_long).unwrap_err();
        assert!(err.to_string().contains("limit is 1000"));

        assert!(serde_json::from_str::<ReviewNotes>(r#"" ""#).is_err());
        assert_eq!(
            serde_json::from_str::<Option<ReviewNotes>>("null").unwrap(),
            None
        );
        let ok: ReviewNotes = serde_json::from_str(r#""fine""#).unwrap();
        assert_eq!(ok.as_str(), "fine");
    }

    #[test]
    fn test_assign_id_only_once() {
        let mut entry = pending(RiskLevel::Safe);
        assert!(!entry.is_new());
        assert!(entry.assign_id(FeedbackId(2)).is_err());
        assert_eq!(entry.id(), Some(FeedbackId(1)));
    }

    #[test]
    fn test_feedback_id_parse() {
        assert_eq!("12".parse::<FeedbackId>().unwrap(), FeedbackId(12));
        assert!("0".parse::<FeedbackId>().is_err());
        assert!("-3".parse::<FeedbackId>().is_err());
        assert!("abc".parse::<FeedbackId>().is_err());
    }

    #[test]
    fn test_apply_returns_new_value_and_keeps_input() {
        let entry = pending(RiskLevel::Safe);
        let approved = entry
            .apply(ReviewAction::LlmApprove, notes("Looks good"), later(60))
            .unwrap();

        assert_eq!(entry.status(), FeedbackStatus::Pending);
        assert_eq!(approved.status(), FeedbackStatus::LlmApproved);
        assert_eq!(approved.updated_at(), later(60));
        assert_eq!(approved.created_at(), now());
        assert_eq!(approved.review_notes().unwrap().as_str(), "Looks good");
        assert_eq!(approved.risk_level(), entry.risk_level());
        assert_eq!(approved.payload(), entry.payload());
    }

    #[test]
    fn test_safe_path_merges_after_llm_approval() {
        let entry = pending(RiskLevel::Safe);
        let approved = entry.apply(ReviewAction::LlmApprove, None, later(60)).unwrap();
        assert!(approved.can_auto_merge());
        assert!(!approved.requires_human_review());

        let merged = approved.apply(ReviewAction::Merge, None, later(120)).unwrap();
        assert_eq!(merged.status(), FeedbackStatus::Merged);
        assert!(merged.is_terminal());
    }

    #[test]
    fn test_medium_path_requires_human() {
        let entry = pending(RiskLevel::Medium);
        let approved = entry.apply(ReviewAction::LlmApprove, None, later(60)).unwrap();
        assert!(approved.requires_human_review());
        assert!(!approved.can_auto_merge());

        let err = approved
            .apply(ReviewAction::Merge, None, later(90))
            .unwrap_err();
        assert_eq!(
            err,
            ReviewError::InvalidTransition {
                id: Some(FeedbackId(1)),
                status: FeedbackStatus::LlmApproved,
                action: ReviewAction::Merge,
                reason: crate::state_machine::RejectionReason::HumanApprovalRequired,
            }
        );

        let human = approved
            .apply(ReviewAction::HumanApprove, None, later(120))
            .unwrap();
        let merged = human.apply(ReviewAction::Merge, None, later(180)).unwrap();
        assert_eq!(merged.status(), FeedbackStatus::Merged);
    }

    #[test]
    fn test_llm_decision_replaces_notes() {
        let entry = pending(RiskLevel::Safe);
        let rejected = entry
            .apply(ReviewAction::LlmReject, notes("Rejected: Invalid format"), later(60))
            .unwrap();
        assert_eq!(
            rejected.review_notes().unwrap().as_str(),
            "Rejected: Invalid format"
        );

        let approved = entry.apply(ReviewAction::LlmApprove, None, later(60)).unwrap();
        assert!(approved.review_notes().is_none());
    }

    #[test]
    fn test_human_decision_keeps_previous_notes_when_absent() {
        let entry = pending(RiskLevel::Medium);
        let approved = entry
            .apply(ReviewAction::LlmApprove, notes("Approved by LLM"), later(60))
            .unwrap();

        let human = approved
            .apply(ReviewAction::HumanApprove, None, later(120))
            .unwrap();
        assert_eq!(human.review_notes().unwrap().as_str(), "Approved by LLM");

        let rejected = approved
            .apply(
                ReviewAction::HumanReject,
                notes("Rejected: Security concern"),
                later(120),
            )
            .unwrap();
        assert_eq!(
            rejected.review_notes().unwrap().as_str(),
            "Rejected: Security concern"
        );
    }

    #[test]
    fn test_failed_apply_is_repeatable() {
        let entry = pending(RiskLevel::Safe);
        let rejected = entry.apply(ReviewAction::LlmReject, None, later(60)).unwrap();

        let first = rejected.apply(ReviewAction::LlmApprove, None, later(90));
        let second = rejected.apply(ReviewAction::LlmApprove, None, later(120));
        assert_eq!(first, second);
        assert!(first.unwrap_err().is_invalid_transition());
    }

    #[test]
    fn test_record_round_trip_into_entry() {
        let record = FeedbackRecord {
            id: FeedbackId(5),
            target_type: TargetType::ClassTemplate,
            target_id: Some(TargetId(77)),
            feedback_type: FeedbackType::Modify,
            payload: payload(r#"{"template": "updated"}"#),
            status: FeedbackStatus::HumanApproved,
            risk_level: RiskLevel::Medium,
            review_notes: notes("Approved by human reviewer"),
            created_at: now(),
            updated_at: later(120),
        };
        let entry = FeedbackEntry::from(record);
        assert_eq!(entry.id(), Some(FeedbackId(5)));
        assert_eq!(entry.target_id(), Some(TargetId(77)));
        assert!(entry.check(ReviewAction::Merge).is_ok());
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = pending(RiskLevel::Medium);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["targetType"], "RULE_EXAMPLE");
        assert_eq!(json["feedbackType"], "ADD");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["riskLevel"], "MEDIUM");
        assert_eq!(json["payload"], r#"{"code": "example"}"#);
        assert!(json["reviewNotes"].is_null());
    }
}

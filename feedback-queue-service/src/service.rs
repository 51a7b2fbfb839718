//! Review orchestration.
//!
//! `ReviewService` is the only component that changes an entry's status.
//! Every transition follows the same path: fetch, validate against the
//! transition table, build the updated entry, then issue exactly one
//! conditional write. A refused action writes nothing, and nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use feedback_queue_core::{
    FeedbackEntry, FeedbackFilter, FeedbackId, FeedbackStatus, NewFeedback, PageRequest,
    RejectionReason, ReviewAction, ReviewError, ReviewNotes, Slice, TargetId, TargetType,
};
use tracing::{debug, info, warn};

use crate::error::QueueError;
use crate::repository::{FeedbackRepository, RepositoryError, UpdateOutcome};
use crate::validator::TransitionValidator;

/// Coordinates the repository and the transition table.
#[derive(Clone)]
pub struct ReviewService {
    repository: Arc<dyn FeedbackRepository>,
    validator: TransitionValidator,
}

impl ReviewService {
    pub fn new(repository: Arc<dyn FeedbackRepository>) -> Self {
        Self {
            validator: TransitionValidator::new(repository.clone()),
            repository,
        }
    }

    pub fn validator(&self) -> &TransitionValidator {
        &self.validator
    }

    /// Persist a new submission in `PENDING`.
    pub async fn submit(&self, feedback: NewFeedback) -> Result<FeedbackId, QueueError> {
        let entry = feedback.into_entry(Utc::now());
        let id = self.repository.insert(&entry).await?;

        info!(
            feedback_id = %id,
            target_type = %entry.target_type(),
            feedback_type = %entry.feedback_type(),
            risk_level = %entry.risk_level(),
            "Feedback submitted"
        );
        Ok(id)
    }

    /// Record a review decision. `MERGE` goes through [`ReviewService::merge`].
    pub async fn apply_action(
        &self,
        id: FeedbackId,
        action: ReviewAction,
        notes: Option<String>,
    ) -> Result<FeedbackEntry, QueueError> {
        if action == ReviewAction::Merge {
            return Err(ReviewError::invalid_argument(
                "action",
                "MERGE is not a review decision; use merge",
            )
            .into());
        }
        let notes = ReviewNotes::parse(notes)?;
        self.transition(id, action, notes).await
    }

    /// Certify an approved entry as merged.
    ///
    /// Applying the change to the target catalog is the caller's job; this
    /// only records that the entry passed every gate its risk level demands.
    pub async fn merge(&self, id: FeedbackId) -> Result<FeedbackEntry, QueueError> {
        let current = self.get(id).await?;
        let current = self
            .validator
            .validate_for_merge(current)
            .map_err(|e| log_rejection(id, ReviewAction::Merge, e.into()))?;
        self.commit(current, ReviewAction::Merge, None).await
    }

    /// Fail with `NotFound` unless `id` is stored.
    pub async fn ensure_exists(&self, id: FeedbackId) -> Result<(), QueueError> {
        self.validator.validate_exists(id).await
    }

    pub async fn get(&self, id: FeedbackId) -> Result<FeedbackEntry, QueueError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReviewError::NotFound { id }.into())
    }

    pub async fn list(
        &self,
        filter: &FeedbackFilter,
        page: &PageRequest,
    ) -> Result<Slice<FeedbackEntry>, QueueError> {
        let rows = self.repository.list(filter, page).await?;
        Ok(Slice::from_rows(rows, page))
    }

    pub async fn pending(
        &self,
        target_type: Option<TargetType>,
        page: &PageRequest,
    ) -> Result<Slice<FeedbackEntry>, QueueError> {
        self.list(&FeedbackFilter::pending(target_type), page).await
    }

    /// LLM-approved MEDIUM entries waiting on a human reviewer.
    pub async fn awaiting_human_review(
        &self,
        target_type: Option<TargetType>,
        page: &PageRequest,
    ) -> Result<Slice<FeedbackEntry>, QueueError> {
        self.list(&FeedbackFilter::awaiting_human_review(target_type), page)
            .await
    }

    /// LLM-approved SAFE entries ready to merge.
    pub async fn auto_mergeable(
        &self,
        page: &PageRequest,
    ) -> Result<Slice<FeedbackEntry>, QueueError> {
        self.list(&FeedbackFilter::auto_mergeable(), page).await
    }

    pub async fn for_target(
        &self,
        target_type: TargetType,
        target_id: TargetId,
        page: &PageRequest,
    ) -> Result<Slice<FeedbackEntry>, QueueError> {
        self.list(&FeedbackFilter::for_target(target_type, target_id), page)
            .await
    }

    async fn transition(
        &self,
        id: FeedbackId,
        action: ReviewAction,
        notes: Option<ReviewNotes>,
    ) -> Result<FeedbackEntry, QueueError> {
        let current = self
            .validator
            .validate_and_get_entry(id, action)
            .await
            .map_err(|e| log_rejection(id, action, e))?;
        self.commit(current, action, notes).await
    }

    /// Build the updated entry and issue the single conditional write.
    async fn commit(
        &self,
        current: FeedbackEntry,
        action: ReviewAction,
        notes: Option<ReviewNotes>,
    ) -> Result<FeedbackEntry, QueueError> {
        let id = current.id().ok_or(RepositoryError::NotPersisted)?;
        let from = current.status();
        let updated = current.apply(action, notes, Utc::now())?;

        match self.repository.update(&updated, from).await? {
            UpdateOutcome::Applied => {
                info!(
                    feedback_id = %id,
                    %action,
                    from = %from,
                    to = %updated.status(),
                    "Transition applied"
                );
                Ok(updated)
            }
            UpdateOutcome::Conflict => Err(self.resolve_conflict(id, action, from).await),
        }
    }

    /// Re-read once after a lost compare-and-set and report what is there now.
    async fn resolve_conflict(
        &self,
        id: FeedbackId,
        action: ReviewAction,
        expected: FeedbackStatus,
    ) -> QueueError {
        let fresh = match self.repository.find_by_id(id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return ReviewError::NotFound { id }.into(),
            Err(e) => return e.into(),
        };

        warn!(
            feedback_id = %id,
            %action,
            expected = %expected,
            found = %fresh.status(),
            "Concurrent update; transition not applied"
        );

        match fresh.check(action) {
            Err(e) => e.into(),
            Ok(_) => {
                debug!(feedback_id = %id, "Action still legal after conflict; not retrying");
                ReviewError::InvalidTransition {
                    id: Some(id),
                    status: fresh.status(),
                    action,
                    reason: RejectionReason::ConcurrentUpdate,
                }
                .into()
            }
        }
    }
}

fn log_rejection(id: FeedbackId, action: ReviewAction, err: QueueError) -> QueueError {
    if let Some(ReviewError::InvalidTransition { status, reason, .. }) = err.as_review() {
        warn!(
            feedback_id = %id,
            %action,
            %status,
            %reason,
            "Rejected transition"
        );
    }
    err
}

//! Lookup-backed checks that run before any write.
//!
//! The transition table itself is pure and lives in the core crate; this
//! module combines it with a repository read so callers get `NotFound` and
//! `InvalidTransition` from one place.

use std::sync::Arc;

use feedback_queue_core::{FeedbackEntry, FeedbackId, ReviewAction, ReviewError};

use crate::error::QueueError;
use crate::repository::FeedbackRepository;

#[derive(Clone)]
pub struct TransitionValidator {
    repository: Arc<dyn FeedbackRepository>,
}

impl TransitionValidator {
    pub fn new(repository: Arc<dyn FeedbackRepository>) -> Self {
        Self { repository }
    }

    /// Fetch `id` and check that `action` is legal from its current state.
    pub async fn validate_and_get_entry(
        &self,
        id: FeedbackId,
        action: ReviewAction,
    ) -> Result<FeedbackEntry, QueueError> {
        let entry = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ReviewError::NotFound { id })?;
        entry.check(action)?;
        Ok(entry)
    }

    /// Re-derive merge legality from the entry's own status and risk level.
    ///
    /// Does not read the store: callers pass the entry they intend to merge.
    pub fn validate_for_merge(&self, entry: FeedbackEntry) -> Result<FeedbackEntry, ReviewError> {
        entry.check(ReviewAction::Merge)?;
        Ok(entry)
    }

    pub async fn validate_exists(&self, id: FeedbackId) -> Result<(), QueueError> {
        if self.repository.exists(id).await? {
            Ok(())
        } else {
            Err(ReviewError::NotFound { id }.into())
        }
    }
}

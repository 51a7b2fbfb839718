use feedback_queue_core::ReviewError;

use crate::repository::RepositoryError;

/// Everything a queue operation can fail with.
///
/// Business errors pass through untouched; storage faults are kept apart so a
/// caller can tell a refused action from a broken database.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl QueueError {
    /// HTTP-style status for a transport that wants one.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Review(ReviewError::NotFound { .. }) => 404,
            Self::Review(ReviewError::InvalidTransition { .. }) => 409,
            Self::Review(ReviewError::InvalidArgument { .. }) => 422,
            Self::Repository(_) => 500,
        }
    }

    /// The business error, if this is one.
    pub fn as_review(&self) -> Option<&ReviewError> {
        match self {
            Self::Review(err) => Some(err),
            Self::Repository(_) => None,
        }
    }
}

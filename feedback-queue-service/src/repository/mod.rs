//! Repository abstraction for feedback entry persistence.
//!
//! `FeedbackRepository` is the only way the service touches storage. Two
//! backends ship: an in-memory one for tests and short-lived processes, and
//! SQLite for anything that must survive a restart.

mod memory;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use feedback_queue_core::{FeedbackEntry, FeedbackFilter, FeedbackId, FeedbackStatus, PageRequest};

/// Errors from the storage layer, kept apart from business errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The backend failed to perform an operation.
    #[error("storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    /// A stored row could not be decoded.
    #[error("corrupt data in {what}")]
    Corruption { what: String },

    /// An update was attempted on an entry that was never inserted.
    #[error("entry has not been persisted yet")]
    NotPersisted,

    /// An insert was attempted on an entry that already carries an ID.
    #[error("entry has already been persisted")]
    AlreadyPersisted,
}

impl RepositoryError {
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn corruption(what: impl Into<String>) -> Self {
        Self::Corruption { what: what.into() }
    }
}

/// Result of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The stored status matched and the new entry was written.
    Applied,
    /// The stored status had moved on (or the row vanished); nothing was written.
    Conflict,
}

/// Storage for feedback entries.
///
/// Every status change goes through [`FeedbackRepository::update`], which is a
/// compare-and-set on the stored status. Two writers racing on the same entry
/// can never both succeed.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Persist a new entry and return the ID assigned to it.
    ///
    /// The entry must be unsaved (`is_new()`); its `id` field is ignored.
    async fn insert(&self, entry: &FeedbackEntry) -> Result<FeedbackId, RepositoryError>;

    async fn find_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackEntry>, RepositoryError>;

    async fn exists(&self, id: FeedbackId) -> Result<bool, RepositoryError>;

    /// Overwrite the stored entry if its status is still `expected_status`.
    async fn update(
        &self,
        entry: &FeedbackEntry,
        expected_status: FeedbackStatus,
    ) -> Result<UpdateOutcome, RepositoryError>;

    /// Entries matching `filter`, ID descending, strictly below the page
    /// cursor, at most `page.fetch_size()` of them.
    async fn list(
        &self,
        filter: &FeedbackFilter,
        page: &PageRequest,
    ) -> Result<Vec<FeedbackEntry>, RepositoryError>;
}

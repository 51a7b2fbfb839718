//! Read-side filters and cursor pagination over feedback entries.
//!
//! Listings are ordered by ID descending (newest first). A page is fetched as
//! `size + 1` rows so the caller can tell whether another page exists without
//! a count query.

use serde::Serialize;

use crate::entry::{FeedbackEntry, FeedbackId, FeedbackType, TargetId, TargetType};
use crate::error::ReviewError;
use crate::state_machine::{FeedbackStatus, RiskLevel};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Conjunction of constraints. An empty list places no constraint on that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackFilter {
    pub statuses: Vec<FeedbackStatus>,
    pub target_types: Vec<TargetType>,
    pub feedback_types: Vec<FeedbackType>,
    pub risk_levels: Vec<RiskLevel>,
    pub target_id: Option<TargetId>,
}

impl FeedbackFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Entries still waiting on the LLM gate.
    pub fn pending(target_type: Option<TargetType>) -> Self {
        Self {
            statuses: vec![FeedbackStatus::Pending],
            target_types: target_type.into_iter().collect(),
            ..Self::default()
        }
    }

    /// LLM-approved MEDIUM entries waiting on a human.
    pub fn awaiting_human_review(target_type: Option<TargetType>) -> Self {
        Self {
            statuses: vec![FeedbackStatus::LlmApproved],
            risk_levels: vec![RiskLevel::Medium],
            target_types: target_type.into_iter().collect(),
            ..Self::default()
        }
    }

    /// LLM-approved SAFE entries that may merge without a human.
    pub fn auto_mergeable() -> Self {
        Self {
            statuses: vec![FeedbackStatus::LlmApproved],
            risk_levels: vec![RiskLevel::Safe],
            ..Self::default()
        }
    }

    /// Every entry proposing a change to one catalog record.
    pub fn for_target(target_type: TargetType, target_id: TargetId) -> Self {
        Self {
            target_types: vec![target_type],
            target_id: Some(target_id),
            ..Self::default()
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = FeedbackStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_target_types(mut self, types: impl IntoIterator<Item = TargetType>) -> Self {
        self.target_types = types.into_iter().collect();
        self
    }

    pub fn with_feedback_types(mut self, types: impl IntoIterator<Item = FeedbackType>) -> Self {
        self.feedback_types = types.into_iter().collect();
        self
    }

    pub fn with_risk_levels(mut self, levels: impl IntoIterator<Item = RiskLevel>) -> Self {
        self.risk_levels = levels.into_iter().collect();
        self
    }

    /// In-process evaluation, used by the in-memory backend and as the
    /// reference the SQL backend is tested against.
    pub fn matches(&self, entry: &FeedbackEntry) -> bool {
        fn allowed<T: PartialEq>(set: &[T], value: &T) -> bool {
            set.is_empty() || set.contains(value)
        }

        allowed(&self.statuses, &entry.status())
            && allowed(&self.target_types, &entry.target_type())
            && allowed(&self.feedback_types, &entry.feedback_type())
            && allowed(&self.risk_levels, &entry.risk_level())
            && self
                .target_id
                .map_or(true, |wanted| entry.target_id() == Some(wanted))
    }
}

/// Position and size of a requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    cursor: Option<FeedbackId>,
    size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            cursor: None,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// `cursor` is exclusive: only IDs strictly below it are returned.
    pub fn new(cursor: Option<FeedbackId>, size: usize) -> Result<Self, ReviewError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ReviewError::invalid_argument(
                "page_size",
                format!("page size must be between 1 and {}, got {}", MAX_PAGE_SIZE, size),
            ));
        }
        Ok(Self { cursor, size })
    }

    pub fn first(size: usize) -> Result<Self, ReviewError> {
        Self::new(None, size)
    }

    pub fn cursor(&self) -> Option<FeedbackId> {
        self.cursor
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Rows a backend should fetch: one extra to detect a following page.
    pub fn fetch_size(&self) -> usize {
        self.size + 1
    }

    /// Request for the page after `slice`, if there is one.
    pub fn next<T>(&self, slice: &Slice<T>) -> Option<Self> {
        slice.next_cursor.map(|cursor| Self {
            cursor: Some(cursor),
            size: self.size,
        })
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub next_cursor: Option<FeedbackId>,
}

impl Slice<FeedbackEntry> {
    /// Build a page from up to `page.fetch_size()` rows already ordered by ID
    /// descending.
    pub fn from_rows(mut rows: Vec<FeedbackEntry>, page: &PageRequest) -> Self {
        let has_next = rows.len() > page.size();
        rows.truncate(page.size());
        let next_cursor = if has_next {
            rows.last().and_then(FeedbackEntry::id)
        } else {
            None
        };
        Self {
            items: rows,
            has_next,
            next_cursor,
        }
    }
}

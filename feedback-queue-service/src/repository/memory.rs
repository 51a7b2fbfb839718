//! In-memory implementation of `FeedbackRepository`.
//!
//! All entries are lost on restart. The compare-and-set in `update` runs
//! under the write lock, so it gives the same guarantee as the SQLite
//! backend's conditional `UPDATE`.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use feedback_queue_core::{FeedbackEntry, FeedbackFilter, FeedbackId, FeedbackStatus, PageRequest};
use tokio::sync::RwLock;

use super::{FeedbackRepository, RepositoryError, UpdateOutcome};

#[derive(Default)]
struct Inner {
    entries: BTreeMap<FeedbackId, FeedbackEntry>,
    last_id: u64,
}

/// In-memory feedback repository.
///
/// Entries live in a `BTreeMap` keyed by ID so listings come out ordered
/// without sorting.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<Inner>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryRepository {
    async fn insert(&self, entry: &FeedbackEntry) -> Result<FeedbackId, RepositoryError> {
        let mut inner = self.inner.write().await;
        let id = FeedbackId(inner.last_id + 1);

        let mut stored = entry.clone();
        stored
            .assign_id(id)
            .map_err(|_| RepositoryError::AlreadyPersisted)?;

        inner.last_id = id.0;
        inner.entries.insert(id, stored);
        Ok(id)
    }

    async fn find_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackEntry>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(&id).cloned())
    }

    async fn exists(&self, id: FeedbackId) -> Result<bool, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.entries.contains_key(&id))
    }

    async fn update(
        &self,
        entry: &FeedbackEntry,
        expected_status: FeedbackStatus,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let id = entry.id().ok_or(RepositoryError::NotPersisted)?;
        let mut inner = self.inner.write().await;

        match inner.entries.get_mut(&id) {
            Some(stored) if stored.status() == expected_status => {
                *stored = entry.clone();
                Ok(UpdateOutcome::Applied)
            }
            _ => Ok(UpdateOutcome::Conflict),
        }
    }

    async fn list(
        &self,
        filter: &FeedbackFilter,
        page: &PageRequest,
    ) -> Result<Vec<FeedbackEntry>, RepositoryError> {
        let inner = self.inner.read().await;
        let upper = match page.cursor() {
            Some(cursor) => Bound::Excluded(cursor),
            None => Bound::Unbounded,
        };

        Ok(inner
            .entries
            .range((Bound::Unbounded, upper))
            .rev()
            .map(|(_, entry)| entry)
            .filter(|entry| filter.matches(entry))
            .take(page.fetch_size())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use feedback_queue_core::{
        FeedbackPayload, FeedbackType, NewFeedback, ReviewAction, RiskLevel, TargetId, TargetType,
    };
    use proptest::prelude::*;

    fn new_entry(target_type: TargetType, risk_level: RiskLevel) -> FeedbackEntry {
        let at = Utc.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap();
        NewFeedback::new(
            target_type,
            Some(TargetId(3)),
            FeedbackType::Modify,
            FeedbackPayload::new(r#"{"field": "value"}"#).unwrap(),
            risk_level,
        )
        .unwrap()
        .into_entry(at)
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.find_by_id(FeedbackId(1)).await.unwrap().is_none());
        assert!(!repo.exists(FeedbackId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryRepository::new();
        let entry = new_entry(TargetType::CodingRule, RiskLevel::Medium);

        let first = repo.insert(&entry).await.unwrap();
        let second = repo.insert(&entry).await.unwrap();
        assert_eq!(first, FeedbackId(1));
        assert_eq!(second, FeedbackId(2));

        let stored = repo.find_by_id(first).await.unwrap().unwrap();
        assert_eq!(stored.id(), Some(first));
        assert_eq!(stored.status(), FeedbackStatus::Pending);
        assert!(repo.exists(second).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_rejects_saved_entry() {
        let repo = InMemoryRepository::new();
        let id = repo
            .insert(&new_entry(TargetType::CodingRule, RiskLevel::Safe))
            .await
            .unwrap();
        let stored = repo.find_by_id(id).await.unwrap().unwrap();

        let err = repo.insert(&stored).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyPersisted));
        assert!(!repo.exists(FeedbackId(id.0 + 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_is_compare_and_set() {
        let repo = InMemoryRepository::new();
        let id = repo
            .insert(&new_entry(TargetType::RuleExample, RiskLevel::Safe))
            .await
            .unwrap();
        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        let approved = stored
            .apply(ReviewAction::LlmApprove, None, Utc::now())
            .unwrap();
        let rejected = stored
            .apply(ReviewAction::LlmReject, None, Utc::now())
            .unwrap();

        assert_eq!(
            repo.update(&approved, FeedbackStatus::Pending).await.unwrap(),
            UpdateOutcome::Applied
        );
        assert_eq!(
            repo.update(&rejected, FeedbackStatus::Pending).await.unwrap(),
            UpdateOutcome::Conflict
        );
        assert_eq!(
            repo.find_by_id(id).await.unwrap().unwrap().status(),
            FeedbackStatus::LlmApproved
        );
    }

    #[tokio::test]
    async fn test_update_unsaved_entry_fails() {
        let repo = InMemoryRepository::new();
        let entry = new_entry(TargetType::RuleExample, RiskLevel::Safe);
        let err = repo
            .update(&entry, FeedbackStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotPersisted));
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let repo = InMemoryRepository::new();
        for _ in 0..5 {
            repo.insert(&new_entry(TargetType::ChecklistItem, RiskLevel::Safe))
                .await
                .unwrap();
        }

        let page = PageRequest::first(2).unwrap();
        let rows = repo.list(&FeedbackFilter::all(), &page).await.unwrap();
        let ids: Vec<u64> = rows.iter().filter_map(|e| e.id()).map(|id| id.0).collect();
        assert_eq!(ids, vec![5, 4, 3]);

        let page = PageRequest::new(Some(FeedbackId(3)), 2).unwrap();
        let rows = repo.list(&FeedbackFilter::all(), &page).await.unwrap();
        let ids: Vec<u64> = rows.iter().filter_map(|e| e.id()).map(|id| id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    fn arb_target_type() -> impl Strategy<Value = TargetType> {
        proptest::sample::select(TargetType::ALL.to_vec())
    }

    fn arb_risk_level() -> impl Strategy<Value = RiskLevel> {
        proptest::sample::select(RiskLevel::ALL.to_vec())
    }

    fn arb_status() -> impl Strategy<Value = FeedbackStatus> {
        proptest::sample::select(FeedbackStatus::ALL.to_vec())
    }

    proptest! {
        /// Property: list returns exactly the matching entries, in ID
        /// descending order, capped at the fetch size.
        #[test]
        fn list_agrees_with_filter(
            entries in proptest::collection::vec((arb_target_type(), arb_risk_level()), 0..40),
            wanted_type in proptest::option::of(arb_target_type()),
            wanted_risk in proptest::option::of(arb_risk_level()),
            wanted_status in proptest::option::of(arb_status()),
            size in 1usize..15,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let repo = InMemoryRepository::new();
                for (target_type, risk_level) in &entries {
                    repo.insert(&new_entry(*target_type, *risk_level)).await.unwrap();
                }

                let filter = FeedbackFilter::all()
                    .with_target_types(wanted_type)
                    .with_risk_levels(wanted_risk)
                    .with_statuses(wanted_status);
                let page = PageRequest::first(size).unwrap();
                let rows = repo.list(&filter, &page).await.unwrap();

                let expected: Vec<FeedbackId> = (1..=entries.len() as u64)
                    .rev()
                    .map(FeedbackId)
                    .filter(|id| {
                        let (t, r) = entries[(id.0 - 1) as usize];
                        filter.matches(&new_entry(t, r))
                    })
                    .take(page.fetch_size())
                    .collect();
                let actual: Vec<FeedbackId> = rows.iter().filter_map(|e| e.id()).collect();
                assert_eq!(actual, expected);
            });
        }
    }
}

//! Storage contract consumed by the dashboard session.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Activity, CampusId, DateRange, EntryPatch, Group, GroupId, ScheduleEntry};

/// Schedule documents keyed by their stored id (`"YYYY-MM-DD_<groupId>"`).
pub type ScheduleDocuments = BTreeMap<String, ScheduleEntry>;

/// One write of a batch: document id and the fields to merge into it.
pub type DocumentWrite = (String, EntryPatch);

/// Document store holding groups, activities and daily schedule entries.
///
/// Writes have merge semantics: fields left `None` in an [`EntryPatch`] keep
/// their stored value, and a missing document is created from the default
/// entry first.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared behind an `Arc`.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// `Ok(false)` when the store answers but reports itself unhealthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Groups affiliated with `campus_id` (case-insensitive match).
    async fn fetch_groups(&self, campus_id: &CampusId) -> RepositoryResult<Vec<Group>>;

    async fn fetch_activities(&self) -> RepositoryResult<Vec<Activity>>;

    /// Schedule documents of `group_ids` whose date falls in `range`.
    ///
    /// Ids are returned undecoded; callers are responsible for rejecting
    /// malformed ones.
    async fn fetch_schedule_entries(
        &self,
        group_ids: &[GroupId],
        range: &DateRange,
    ) -> RepositoryResult<ScheduleDocuments>;

    /// Apply every write or none of them. Returns the number of documents written.
    async fn commit_batch(&self, writes: Vec<DocumentWrite>) -> RepositoryResult<usize>;

    /// Merge a single write and return the stored document.
    async fn upsert_one(&self, doc_id: &str, patch: &EntryPatch) -> RepositoryResult<ScheduleEntry>;
}

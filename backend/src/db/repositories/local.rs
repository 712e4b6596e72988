//! In-memory schedule store.
//!
//! Holds groups, activities and schedule documents in plain collections behind
//! a single lock. Used for tests, for the command-line planner and anywhere a
//! real document database is not available.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::db::keys::split_doc_id;
use crate::db::repository::{
    DocumentWrite, ErrorContext, RepositoryError, RepositoryResult, ScheduleDocuments, ScheduleStore,
};
use crate::models::{Activity, CampusId, DateRange, EntryPatch, Group, GroupId, ScheduleEntry};

const SCHEDULE_COLLECTION: &str = "dailySchedule";

/// In-memory store.
///
/// Cloning shares the underlying data, so a test can keep a handle while the
/// session owns another.
///
/// # Example
/// ```
/// use campus_scheduler::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.set_healthy(false);
/// assert_eq!(repo.document_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    groups: Vec<Group>,
    activities: Vec<Activity>,
    schedule: BTreeMap<String, ScheduleEntry>,
    committed_batches: usize,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            activities: Vec::new(),
            schedule: BTreeMap::new(),
            committed_batches: 0,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group. Insertion order is the order groups are returned in.
    pub fn add_group(&self, group: Group) {
        self.data.write().groups.push(group);
    }

    pub fn add_activity(&self, activity: Activity) {
        self.data.write().activities.push(activity);
    }

    /// Store a document as-is, bypassing id checks.
    pub fn insert_document(&self, doc_id: impl Into<String>, entry: ScheduleEntry) {
        self.data.write().schedule.insert(doc_id.into(), entry);
    }

    pub fn document(&self, doc_id: &str) -> Option<ScheduleEntry> {
        self.data.read().schedule.get(doc_id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.data.read().schedule.len()
    }

    pub fn group_count(&self) -> usize {
        self.data.read().groups.len()
    }

    /// Number of batches committed successfully so far.
    pub fn committed_batches(&self) -> usize {
        self.data.read().committed_batches
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Store is not reachable",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }

    fn validate_doc_id(doc_id: &str, operation: &str) -> RepositoryResult<()> {
        match split_doc_id(doc_id) {
            Some((date, group)) if !date.is_empty() && !group.is_empty() => Ok(()),
            _ => Err(RepositoryError::validation_with_context(
                "Schedule document id must look like <date>_<groupId>",
                ErrorContext::new(operation)
                    .with_entity(SCHEDULE_COLLECTION)
                    .with_entity_id(doc_id),
            )),
        }
    }
}

fn merge_into(schedule: &mut BTreeMap<String, ScheduleEntry>, doc_id: String, patch: &EntryPatch) -> ScheduleEntry {
    let entry = schedule.entry(doc_id).or_default();
    patch.apply_to(entry);
    entry.clone()
}

#[async_trait]
impl ScheduleStore for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_groups(&self, campus_id: &CampusId) -> RepositoryResult<Vec<Group>> {
        self.check_health("fetch_groups")?;
        let data = self.data.read();
        Ok(data
            .groups
            .iter()
            .filter(|group| group.belongs_to(campus_id))
            .cloned()
            .collect())
    }

    async fn fetch_activities(&self) -> RepositoryResult<Vec<Activity>> {
        self.check_health("fetch_activities")?;
        Ok(self.data.read().activities.clone())
    }

    async fn fetch_schedule_entries(
        &self,
        group_ids: &[GroupId],
        range: &DateRange,
    ) -> RepositoryResult<ScheduleDocuments> {
        self.check_health("fetch_schedule_entries")?;
        let wanted: HashSet<&str> = group_ids.iter().map(|id| id.as_str()).collect();
        let data = self.data.read();

        let mut documents = ScheduleDocuments::new();
        for (doc_id, entry) in &data.schedule {
            let Some((date, group)) = split_doc_id(doc_id) else {
                log::warn!("Skipping schedule document without group suffix: {doc_id}");
                continue;
            };
            if !wanted.contains(group) {
                continue;
            }
            // Undecodable dates are handed back for the caller to report.
            let in_range = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|day| range.contains(day))
                .unwrap_or(true);
            if in_range {
                documents.insert(doc_id.clone(), entry.clone());
            }
        }
        Ok(documents)
    }

    async fn commit_batch(&self, writes: Vec<DocumentWrite>) -> RepositoryResult<usize> {
        self.check_health("commit_batch")?;
        for (doc_id, _) in &writes {
            Self::validate_doc_id(doc_id, "commit_batch").map_err(|err| {
                RepositoryError::transaction_with_context(
                    format!("Batch rejected, nothing written: {err}"),
                    ErrorContext::new("commit_batch").with_entity(SCHEDULE_COLLECTION),
                )
            })?;
        }

        let mut data = self.data.write();
        let count = writes.len();
        for (doc_id, patch) in writes {
            merge_into(&mut data.schedule, doc_id, &patch);
        }
        data.committed_batches += 1;
        log::debug!("Committed batch of {count} schedule documents");
        Ok(count)
    }

    async fn upsert_one(&self, doc_id: &str, patch: &EntryPatch) -> RepositoryResult<ScheduleEntry> {
        self.check_health("upsert_one")?;
        Self::validate_doc_id(doc_id, "upsert_one")?;
        let mut data = self.data.write();
        Ok(merge_into(&mut data.schedule, doc_id.to_string(), patch))
    }
}

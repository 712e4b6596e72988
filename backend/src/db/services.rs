//! Store-agnostic operations that translate between stored documents and the
//! structured schedule types.
//!
//! Document ids only exist on this side of the boundary: everything returned
//! from here is keyed by [`ScheduleKey`] and everything written is encoded
//! with [`encode_key`].
//!
//! ```no_run
//! use campus_scheduler::db::{repositories::LocalRepository, services};
//! use campus_scheduler::models::CampusId;
//!
//! # async fn run() -> Result<(), campus_scheduler::db::RepositoryError> {
//! let repo = LocalRepository::new();
//! let groups = services::fetch_groups(&repo, &CampusId::from("north")).await?;
//! println!("{} groups", groups.len());
//! # Ok(())
//! # }
//! ```

use log::{info, warn};

use super::keys::{decode_key, encode_key};
use super::repository::{RepositoryResult, ScheduleStore};
use crate::models::{
    Activity, CampusId, DateRange, EntryPatch, Group, GroupId, ScheduleEntry, ScheduleKey, ScheduleMap,
};
use crate::scheduling::{Diagnostic, DiagnosticKind, Diagnostics};

pub async fn health_check<R: ScheduleStore + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

pub async fn fetch_groups<R: ScheduleStore + ?Sized>(
    repo: &R,
    campus_id: &CampusId,
) -> RepositoryResult<Vec<Group>> {
    let groups = repo
        .fetch_groups(campus_id)
        .await
        .map_err(|e| e.with_entity("groups"))?;
    info!("Fetched {} groups for campus {}", groups.len(), campus_id);
    Ok(groups)
}

pub async fn fetch_activities<R: ScheduleStore + ?Sized>(repo: &R) -> RepositoryResult<Vec<Activity>> {
    repo.fetch_activities()
        .await
        .map_err(|e| e.with_entity("activities"))
}

/// Load the schedule of `group_ids` over `range`.
///
/// Documents whose id does not decode are left out and reported as
/// [`DiagnosticKind::MalformedKey`].
pub async fn load_schedule<R: ScheduleStore + ?Sized>(
    repo: &R,
    group_ids: &[GroupId],
    range: &DateRange,
) -> RepositoryResult<(ScheduleMap, Diagnostics)> {
    if group_ids.is_empty() || range.is_empty() {
        return Ok((ScheduleMap::new(), Diagnostics::new()));
    }

    let documents = repo
        .fetch_schedule_entries(group_ids, range)
        .await
        .map_err(|e| e.with_entity("dailySchedule"))?;

    let mut diagnostics = Diagnostics::new();
    let mut schedule = ScheduleMap::new();
    for (doc_id, entry) in documents {
        match decode_key(&doc_id) {
            Ok(key) if range.contains(key.date) => {
                schedule.insert(key, entry);
            }
            Ok(_) => {}
            Err(err) => diagnostics.record(Diagnostic::new(DiagnosticKind::MalformedKey, err.to_string())),
        }
    }

    info!(
        "Loaded {} schedule entries for {} groups ({} to {})",
        schedule.len(),
        group_ids.len(),
        range.start,
        range.end
    );
    Ok((schedule, diagnostics))
}

/// Commit `patches` as one atomic batch. An empty batch is not sent.
pub async fn commit_patches<R: ScheduleStore + ?Sized>(
    repo: &R,
    patches: &[(ScheduleKey, EntryPatch)],
) -> RepositoryResult<usize> {
    let writes: Vec<_> = patches
        .iter()
        .filter(|(_, patch)| !patch.is_empty())
        .map(|(key, patch)| (encode_key(key), patch.clone()))
        .collect();
    if writes.is_empty() {
        return Ok(0);
    }

    let count = writes.len();
    match repo.commit_batch(writes).await {
        Ok(written) => Ok(written),
        Err(err) => {
            warn!("Batch of {count} schedule writes failed: {err}");
            Err(err.with_operation("commit_batch"))
        }
    }
}

/// Merge a single patch into one cell.
pub async fn upsert_entry<R: ScheduleStore + ?Sized>(
    repo: &R,
    key: &ScheduleKey,
    patch: &EntryPatch,
) -> RepositoryResult<ScheduleEntry> {
    repo.upsert_one(&encode_key(key), patch)
        .await
        .map_err(|e| e.with_operation("upsert_one"))
}

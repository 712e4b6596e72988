//! DashboardSession against the in-memory store.

mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use campus_scheduler::db::repository::{
    DocumentWrite, RepositoryResult, ScheduleDocuments, ScheduleStore,
};
use campus_scheduler::db::LocalRepository;
use campus_scheduler::models::{
    Activity, CampusId, CellUpdate, ClassStatus, DateRange, EntryPatch, Group, GroupId,
    ScheduleEntry,
};
use campus_scheduler::scheduling::{CellKind, DiagnosticKind, PaintState, WriteRejection};
use campus_scheduler::services::{DashboardSession, SessionError};
use support::{config, june, key, seeded_repo};

async fn loaded_session(repo: &LocalRepository) -> DashboardSession {
    let session = DashboardSession::new(Arc::new(repo.clone()), &config()).unwrap();
    session.load().await.unwrap();
    session
}

/// Store whose batch commits take a while and record when they start and end.
struct SlowStore {
    inner: LocalRepository,
    events: Mutex<Vec<String>>,
}

impl SlowStore {
    fn new(inner: LocalRepository) -> Self {
        Self {
            inner,
            events: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScheduleStore for SlowStore {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn fetch_groups(&self, campus_id: &CampusId) -> RepositoryResult<Vec<Group>> {
        self.inner.fetch_groups(campus_id).await
    }

    async fn fetch_activities(&self) -> RepositoryResult<Vec<Activity>> {
        self.inner.fetch_activities().await
    }

    async fn fetch_schedule_entries(
        &self,
        group_ids: &[GroupId],
        range: &DateRange,
    ) -> RepositoryResult<ScheduleDocuments> {
        self.inner.fetch_schedule_entries(group_ids, range).await
    }

    async fn commit_batch(&self, writes: Vec<DocumentWrite>) -> RepositoryResult<usize> {
        let first = writes.first().map(|(id, _)| id.clone()).unwrap_or_default();
        self.events.lock().push(format!("start {first}"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        let result = self.inner.commit_batch(writes).await;
        self.events.lock().push(format!("end {first}"));
        result
    }

    async fn upsert_one(&self, doc_id: &str, patch: &EntryPatch) -> RepositoryResult<ScheduleEntry> {
        self.inner.upsert_one(doc_id, patch).await
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_builds_padded_window() {
    let repo = seeded_repo();
    repo.insert_document("2024-06-04_G1", ScheduleEntry::with_activity("Museum"));
    repo.insert_document("2024-07-30_G1", ScheduleEntry::with_activity("Museum"));
    repo.insert_document("garbage_G2", ScheduleEntry::default());

    let session = DashboardSession::new(Arc::new(repo), &config()).unwrap();
    let summary = session.load().await.unwrap();

    assert_eq!(summary.groups, 3);
    assert_eq!(summary.activities, 3);
    assert_eq!(summary.entries, 1);
    assert_eq!(
        summary.window,
        Some(DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 5, 26).unwrap(),
            june(17)
        ))
    );
    assert_eq!(session.diagnostics().count_of(DiagnosticKind::MalformedKey), 1);
    assert_eq!(session.entry(&key(4, "G1")).activity, "Museum");
}

#[tokio::test]
async fn test_groups_listed_by_arrival() {
    let repo = LocalRepository::new();
    repo.add_group(support::group("late", 10, 9, 14));
    repo.add_group(support::group("early", 10, 2, 8));
    let session = loaded_session(&repo).await;

    let ids: Vec<_> = session.groups().into_iter().map(|g| g.id.to_string()).collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[tokio::test]
async fn test_load_failure_is_reported() {
    let repo = seeded_repo();
    repo.set_healthy(false);
    let session = DashboardSession::new(Arc::new(repo), &config()).unwrap();

    let err = session.load().await.unwrap_err();
    assert!(matches!(err, SessionError::Load(_)));
    assert!(err.to_string().starts_with("Failed to load schedule: Connection error"));
}

// ---------------------------------------------------------------------------
// Auto-schedule and orientation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_auto_schedule_persists_greedy_result() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;

    let outcome = session.run_auto_schedule().await.unwrap().unwrap();
    assert_eq!(outcome.class_days, 5);
    assert_eq!(outcome.assigned, 5);
    assert_eq!(outcome.unassigned, 5);
    assert_eq!(outcome.written, 10);

    assert_eq!(
        repo.document("2024-06-03_G1").unwrap().class_status,
        ClassStatus::Morning
    );
    assert_eq!(
        repo.document("2024-06-03_G2").unwrap().class_status,
        ClassStatus::None
    );
    assert!(repo.document("2024-06-08_G1").is_none());
    assert_eq!(session.group_hours(&"G1".into()), Some(15));
    assert_eq!(session.total_hours().get(&GroupId::from("G2")), Some(&0));
    assert_eq!(session.diagnostics().count_of(DiagnosticKind::SessionFull), 5);
}

#[tokio::test]
async fn test_second_auto_schedule_while_running_is_ignored() {
    let repo = seeded_repo();
    let session = DashboardSession::new(Arc::new(SlowStore::new(repo.clone())), &config()).unwrap();
    session.load().await.unwrap();

    let (first, second) = tokio::join!(session.run_auto_schedule(), session.run_auto_schedule());
    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_none());
    assert_eq!(repo.committed_batches(), 1);

    // flag released once the run settles
    assert!(session.run_auto_schedule().await.unwrap().is_some());
}

#[tokio::test]
async fn test_second_orientation_run_while_running_is_ignored() {
    let repo = seeded_repo();
    let session = DashboardSession::new(Arc::new(SlowStore::new(repo.clone())), &config()).unwrap();
    session.load().await.unwrap();

    let (first, second) = tokio::join!(session.assign_orientations(), session.assign_orientations());
    assert_eq!(first.unwrap().unwrap().placed, 3);
    assert!(second.unwrap().is_none());
    assert_eq!(repo.committed_batches(), 1);

    assert!(session.assign_orientations().await.unwrap().is_some());
}

#[tokio::test]
async fn test_repeated_runs_do_not_pile_up_diagnostics() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;

    session.run_auto_schedule().await.unwrap();
    session.run_auto_schedule().await.unwrap();
    session.assign_orientations().await.unwrap();
    session.assign_orientations().await.unwrap();
    assert_eq!(session.diagnostics().count_of(DiagnosticKind::SessionFull), 5);
}

#[tokio::test]
async fn test_failed_save_keeps_optimistic_state_until_reload() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;
    repo.set_healthy(false);

    let err = session.run_auto_schedule().await.unwrap_err();
    assert!(err.to_string().starts_with("Batch save failed: Connection error"));
    assert_eq!(session.entry(&key(3, "G1")).class_status, ClassStatus::Morning);
    assert_eq!(repo.document_count(), 0);

    repo.set_healthy(true);
    session.load().await.unwrap();
    assert_eq!(session.entry(&key(3, "G1")).class_status, ClassStatus::None);
}

#[tokio::test]
async fn test_orientation_keeps_class_status() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;
    session.run_auto_schedule().await.unwrap();

    let outcome = session.assign_orientations().await.unwrap().unwrap();
    assert_eq!(outcome.placed, 3);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.written, 3);

    let g1 = repo.document("2024-06-03_G1").unwrap();
    assert_eq!(g1.activity, "Orientation");
    assert_eq!(g1.class_status, ClassStatus::Morning);

    // Friday arrival: Saturday and Sunday skipped, Monday departure used
    let g3 = repo.document("2024-06-10_G3").unwrap();
    assert_eq!(g3.activity, "Orientation");
    assert_eq!(g3.class_status, ClassStatus::None);
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_paint_gesture_commits_one_batch() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;
    let double = CellUpdate::Class(ClassStatus::Double);

    // travel day: ignored
    assert!(!session.begin_paint(key(2, "G1"), double.clone()));
    assert_eq!(session.paint_state(), PaintState::Idle);

    assert!(session.begin_paint(key(4, "G1"), double.clone()));
    assert!(session.continue_paint(key(5, "G1"), double.clone()));
    // weekend cells cannot take classes
    assert_eq!(session.cell_kind(&key(8, "G3")), Some(CellKind::Weekend));
    assert!(!session.continue_paint(key(8, "G3"), double.clone()));
    assert!(session.continue_paint(key(5, "G2"), double));
    assert_eq!(session.entry(&key(5, "G2")).class_status, ClassStatus::Double);

    let outcome = session.end_paint().await.unwrap().unwrap();
    assert_eq!(outcome.staged, 3);
    assert_eq!(outcome.dropped, 0);
    assert_eq!(outcome.written, 3);
    assert_eq!(repo.committed_batches(), 1);
    assert_eq!(session.paint_state(), PaintState::Idle);
    assert_eq!(session.group_hours(&"G1".into()), Some(12));

    assert!(session.end_paint().await.unwrap().is_none());
}

#[tokio::test]
async fn test_weekend_activity_paint_drops_half_day() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;

    assert!(session.begin_paint(key(8, "G3"), CellUpdate::Activity("Excursion".into())));
    session.continue_paint(key(9, "G3"), CellUpdate::Activity("Museum".into()));
    assert_eq!(session.entry(&key(9, "G3")).activity, "");

    let outcome = session.end_paint().await.unwrap().unwrap();
    assert_eq!(outcome.staged, 2);
    assert_eq!(outcome.dropped, 1);
    assert_eq!(outcome.written, 1);
    assert_eq!(repo.document("2024-06-08_G3").unwrap().activity, "Excursion");
    assert!(repo.document("2024-06-09_G3").is_none());
}

#[tokio::test]
async fn test_failed_flush_clears_batch() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;

    session.begin_paint(key(4, "G1"), CellUpdate::Class(ClassStatus::Afternoon));
    repo.set_healthy(false);
    let err = session.end_paint().await.unwrap_err();
    assert!(matches!(err, SessionError::Save(_)));
    assert_eq!(session.paint_state(), PaintState::Idle);
    assert_eq!(session.entry(&key(4, "G1")).class_status, ClassStatus::Afternoon);

    repo.set_healthy(true);
    assert!(session.end_paint().await.unwrap().is_none());
    assert_eq!(repo.document_count(), 0);
}

#[tokio::test]
async fn test_flushes_are_serialised() {
    let repo = seeded_repo();
    let store = Arc::new(SlowStore::new(repo.clone()));
    let session = DashboardSession::new(store.clone(), &config()).unwrap();
    session.load().await.unwrap();
    let morning = CellUpdate::Class(ClassStatus::Morning);

    session.begin_paint(key(3, "G1"), morning.clone());
    let (first, second) = tokio::join!(session.end_paint(), async {
        // painting resumes locally while the first batch is in flight
        assert!(session.begin_paint(key(4, "G2"), morning.clone()));
        session.end_paint().await
    });
    assert_eq!(first.unwrap().unwrap().written, 1);
    assert_eq!(second.unwrap().unwrap().written, 1);

    let events = store.events.lock().clone();
    assert_eq!(
        events,
        vec![
            "start 2024-06-03_G1",
            "end 2024-06-03_G1",
            "start 2024-06-04_G2",
            "end 2024-06-04_G2",
        ]
    );
}

// ---------------------------------------------------------------------------
// Ad hoc edits and views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_edit_entry_validates_and_persists() {
    let repo = seeded_repo();
    repo.insert_document("2024-06-05_G1", ScheduleEntry::with_status(ClassStatus::Morning));
    let session = loaded_session(&repo).await;

    let stored = session.set_secondary_info(key(5, "G1"), "bring passports").await.unwrap();
    assert_eq!(stored.class_status, ClassStatus::Morning);
    assert_eq!(stored.secondary_info, "bring passports");

    let err = session
        .edit_entry(key(5, "G1"), EntryPatch::activity("Excursion"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Rejected {
            reason: WriteRejection::FullDayOverHalfDayClass { .. },
            ..
        }
    ));

    // clearing the class in the same edit makes room for the excursion
    let patch = EntryPatch {
        class_status: Some(ClassStatus::None),
        activity: Some("Excursion".into()),
        secondary_info: None,
    };
    let stored = session.edit_entry(key(5, "G1"), patch).await.unwrap();
    assert_eq!(stored.activity, "Excursion");
    assert_eq!(stored.secondary_info, "bring passports");

    let err = session
        .set_secondary_info(key(5, "nobody"), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotEditable(_)));
}

#[tokio::test]
async fn test_edit_entry_follows_cell_rules() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;

    for (cell, patch) in [
        // Saturday inside G3's stay
        (key(8, "G3"), EntryPatch::class_status(ClassStatus::Morning)),
        // arrival day
        (key(2, "G1"), EntryPatch::class_status(ClassStatus::Double)),
        (key(2, "G1"), EntryPatch::activity("Museum")),
        // after departure
        (key(25, "G1"), EntryPatch::class_status(ClassStatus::Morning)),
    ] {
        let err = session.edit_entry(cell.clone(), patch).await.unwrap_err();
        assert!(matches!(err, SessionError::NotEditable(_)), "{cell}: {err}");
    }
    assert_eq!(repo.document_count(), 0);

    // notes are allowed on travel days, full-day activities on weekends
    session.set_secondary_info(key(8, "G1"), "bus at 9").await.unwrap();
    session
        .edit_entry(key(8, "G3"), EntryPatch::activity("Excursion"))
        .await
        .unwrap();

    session
        .edit_entry(key(4, "G1"), EntryPatch::activity("Excursion"))
        .await
        .unwrap();
    let err = session
        .edit_entry(key(4, "G1"), EntryPatch::class_status(ClassStatus::Morning))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Rejected {
            reason: WriteRejection::FullDayOverHalfDayClass {
                status: ClassStatus::Morning
            },
            ..
        }
    ));
    assert_eq!(session.entry(&key(4, "G1")).class_status, ClassStatus::None);

    let stored = session
        .edit_entry(key(4, "G1"), EntryPatch::class_status(ClassStatus::Double))
        .await
        .unwrap();
    assert_eq!(stored.class_status, ClassStatus::Double);
    assert_eq!(stored.activity, "Excursion");
    assert_eq!(repo.document_count(), 3);
}

#[tokio::test]
async fn test_headcounts_and_itinerary() {
    let repo = seeded_repo();
    let session = loaded_session(&repo).await;
    session.run_auto_schedule().await.unwrap();

    let counts = session.daily_headcounts();
    assert_eq!(counts.len(), session.window().unwrap().len());
    let monday = counts.iter().find(|c| c.date == june(3)).unwrap();
    assert_eq!((monday.am, monday.pm, monday.unassigned), (40, 0, 30));
    let friday = counts.iter().find(|c| c.date == june(7)).unwrap();
    assert_eq!((friday.am, friday.pm, friday.unassigned), (40, 0, 40));

    let days = session.itinerary(&"G3".into()).unwrap();
    let kinds: Vec<_> = days.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CellKind::Arrival,
            CellKind::Weekend,
            CellKind::Weekend,
            CellKind::Departure
        ]
    );
    assert!(session.itinerary(&"nobody".into()).is_none());
}

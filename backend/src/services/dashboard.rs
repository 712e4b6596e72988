//! Operator session over one campus schedule.
//!
//! [`DashboardSession`] owns the in-memory view (groups, activity catalog,
//! schedule map, paint gesture) and is the only place where the pure
//! scheduling functions meet the store. Local state is updated optimistically
//! before each write; a failed write is reported but not rolled back, and the
//! next [`DashboardSession::load`] discards whatever the store did not accept.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::repository::{RepositoryError, RepositoryResult, ScheduleStore};
use crate::db::services;
use crate::models::{
    ActivityCatalog, CampusId, CellUpdate, DateRange, EntryPatch, Group, GroupId, PaintMode,
    ScheduleEntry, ScheduleKey, ScheduleMap,
};
use crate::scheduling::{
    classify_cell, compute_auto_schedule, compute_stay, daily_headcounts, dashboard_window,
    find_orientation_slots, group_hours, group_itinerary, sort_by_arrival, total_hours, CellKind,
    Diagnostics, ItineraryDay, PaintSession, PaintState, SchedulePolicy, SessionHeadcount,
    StandardPolicy, Stay, WriteRejection,
};

/// Failures reported to the operator. Each maps to one message.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to load schedule: {0}")]
    Load(#[source] RepositoryError),

    #[error("Batch save failed: {0}")]
    Save(#[source] RepositoryError),

    #[error("Failed to save {key}: {source}")]
    Upsert {
        key: ScheduleKey,
        #[source]
        source: RepositoryError,
    },

    #[error("Write refused at {key}: {reason}")]
    Rejected {
        key: ScheduleKey,
        reason: WriteRejection,
    },

    #[error("Cell {0} is not editable")]
    NotEditable(ScheduleKey),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Reentrancy guard: held while an auto-schedule or orientation run is in flight.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub groups: usize,
    pub activities: usize,
    pub entries: usize,
    pub window: Option<DateRange>,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScheduleOutcome {
    pub class_days: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationOutcome {
    pub placed: usize,
    pub skipped: usize,
    pub written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintOutcome {
    pub staged: usize,
    pub dropped: usize,
    pub written: usize,
}

#[derive(Default)]
struct ViewState {
    /// Roster order, as returned by the store.
    groups: Vec<Group>,
    stays: BTreeMap<GroupId, Stay>,
    catalog: ActivityCatalog,
    schedule: ScheduleMap,
    window: Option<DateRange>,
    paint: PaintSession,
    /// Found while loading; replaced on every load.
    diagnostics: Diagnostics,
    /// Latest auto-schedule run only.
    auto_schedule_diagnostics: Diagnostics,
    /// Latest orientation run only.
    orientation_diagnostics: Diagnostics,
}

impl ViewState {
    fn cell_kind(&self, key: &ScheduleKey) -> Option<CellKind> {
        self.stays
            .get(&key.group_id)
            .map(|stay| classify_cell(stay, key.date))
    }
}

/// One operator's view of a campus schedule.
pub struct DashboardSession {
    store: Arc<dyn ScheduleStore>,
    policy: Arc<dyn SchedulePolicy>,
    campus_id: CampusId,
    orientation_activity: String,
    padding_days: u32,
    state: RwLock<ViewState>,
    auto_schedule_busy: AtomicBool,
    orientation_busy: AtomicBool,
    flush_fence: tokio::sync::Mutex<()>,
}

impl DashboardSession {
    /// Session on the configured campus with the standard policy.
    pub fn new(store: Arc<dyn ScheduleStore>, config: &AppConfig) -> RepositoryResult<Self> {
        let policy = StandardPolicy::from_settings(&config.scheduler)?;
        Ok(Self::with_policy(store, Arc::new(policy), config))
    }

    pub fn with_policy(
        store: Arc<dyn ScheduleStore>,
        policy: Arc<dyn SchedulePolicy>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            policy,
            campus_id: config.campus.id.clone(),
            orientation_activity: config.scheduler.orientation_activity.clone(),
            padding_days: config.scheduler.dashboard_padding_days,
            state: RwLock::new(ViewState::default()),
            auto_schedule_busy: AtomicBool::new(false),
            orientation_busy: AtomicBool::new(false),
            flush_fence: tokio::sync::Mutex::new(()),
        }
    }

    pub fn campus_id(&self) -> &CampusId {
        &self.campus_id
    }

    /// Fetch groups, activities and the schedule over the dashboard window.
    ///
    /// Replaces the whole view, including any unfinished paint gesture.
    pub async fn load(&self) -> SessionResult<LoadSummary> {
        let store = self.store.as_ref();
        let groups = services::fetch_groups(store, &self.campus_id)
            .await
            .map_err(SessionError::Load)?;
        let activities = services::fetch_activities(store)
            .await
            .map_err(SessionError::Load)?;

        let mut diagnostics = Diagnostics::new();
        let stays: BTreeMap<GroupId, Stay> = groups
            .iter()
            .map(|group| {
                let stay = compute_stay(group, self.policy.calendar(), &mut diagnostics);
                (group.id.clone(), stay)
            })
            .collect();

        let window = dashboard_window(&groups, self.policy.as_ref(), self.padding_days);
        let schedule = match window {
            Some(range) => {
                let ids: Vec<GroupId> = groups.iter().map(|g| g.id.clone()).collect();
                let (schedule, decode_diagnostics) = services::load_schedule(store, &ids, &range)
                    .await
                    .map_err(SessionError::Load)?;
                diagnostics.extend(decode_diagnostics);
                schedule
            }
            None => ScheduleMap::new(),
        };

        let summary = LoadSummary {
            groups: groups.len(),
            activities: activities.len(),
            entries: schedule.len(),
            window,
            warnings: diagnostics.len(),
        };

        *self.state.write() = ViewState {
            groups,
            stays,
            catalog: ActivityCatalog::new(activities),
            schedule,
            window,
            paint: PaintSession::new(),
            diagnostics,
            ..ViewState::default()
        };

        info!(
            "Loaded campus {}: {} groups, {} activities, {} entries",
            self.campus_id, summary.groups, summary.activities, summary.entries
        );
        Ok(summary)
    }

    /// Propose class statuses for the whole window, apply them and persist them.
    ///
    /// Returns `Ok(None)` without doing anything when a run is already in flight.
    pub async fn run_auto_schedule(&self) -> SessionResult<Option<AutoScheduleOutcome>> {
        let Some(_busy) = BusyFlag::try_acquire(&self.auto_schedule_busy) else {
            info!("Auto-schedule already running, ignoring request");
            return Ok(None);
        };

        let (plan, patches) = {
            let mut state = self.state.write();
            let Some(window) = state.window else {
                return Ok(Some(AutoScheduleOutcome {
                    class_days: 0,
                    assigned: 0,
                    unassigned: 0,
                    written: 0,
                }));
            };
            let plan = compute_auto_schedule(
                &state.groups,
                &window,
                &state.schedule,
                self.policy.as_ref(),
            );
            let patches = plan.patches();
            plan.merged_into(&mut state.schedule);
            (plan, patches)
        };

        let assigned = plan.assigned_count();
        let mut outcome = AutoScheduleOutcome {
            class_days: plan.days.len(),
            assigned,
            unassigned: plan.entries.len() - assigned,
            written: 0,
        };
        self.state.write().auto_schedule_diagnostics = plan.diagnostics;

        outcome.written = services::commit_patches(self.store.as_ref(), &patches)
            .await
            .map_err(SessionError::Save)?;
        Ok(Some(outcome))
    }

    /// Place the orientation activity for every group and persist the writes.
    ///
    /// Returns `Ok(None)` without doing anything when a run is already in flight.
    pub async fn assign_orientations(&self) -> SessionResult<Option<OrientationOutcome>> {
        let Some(_busy) = BusyFlag::try_acquire(&self.orientation_busy) else {
            info!("Orientation assignment already running, ignoring request");
            return Ok(None);
        };

        let (plan, group_count) = {
            let mut state = self.state.write();
            let plan = find_orientation_slots(
                &state.groups,
                &state.schedule,
                &state.catalog,
                self.policy.as_ref(),
                &self.orientation_activity,
            );
            plan.merged_into(&mut state.schedule);
            let group_count = state.groups.len();
            state.orientation_diagnostics = plan.diagnostics.clone();
            (plan, group_count)
        };

        let written = services::commit_patches(self.store.as_ref(), &plan.slots)
            .await
            .map_err(SessionError::Save)?;
        Ok(Some(OrientationOutcome {
            placed: plan.len(),
            skipped: group_count - plan.len(),
            written,
        }))
    }

    /// Start a paint gesture on `key`. Non-editable cells are ignored.
    pub fn begin_paint(&self, key: ScheduleKey, update: CellUpdate) -> bool {
        let mut state = self.state.write();
        let paintable = state
            .cell_kind(&key)
            .is_some_and(|kind| kind.is_paintable(update.mode()));
        if !paintable {
            return false;
        }
        let ViewState {
            paint,
            schedule,
            catalog,
            ..
        } = &mut *state;
        paint.begin(key, update, schedule, catalog, self.policy.as_ref());
        true
    }

    /// Extend the current gesture to `key`. Returns whether the live view changed.
    pub fn continue_paint(&self, key: ScheduleKey, update: CellUpdate) -> bool {
        let mut state = self.state.write();
        if !state.paint.is_painting() {
            return false;
        }
        let paintable = state
            .cell_kind(&key)
            .is_some_and(|kind| kind.is_paintable(update.mode()));
        if !paintable {
            return false;
        }
        let ViewState {
            paint,
            schedule,
            catalog,
            ..
        } = &mut *state;
        paint.extend(key, update, schedule, catalog, self.policy.as_ref())
    }

    /// End the gesture and commit its batch.
    ///
    /// A flush waits for the previous one to settle before writing. Returns
    /// `Ok(None)` when no gesture was in progress.
    pub async fn end_paint(&self) -> SessionResult<Option<PaintOutcome>> {
        let batch = {
            let mut state = self.state.write();
            let ViewState { paint, catalog, .. } = &mut *state;
            paint.finish(catalog, self.policy.as_ref())
        };
        let Some(batch) = batch else {
            return Ok(None);
        };

        let _fence = self.flush_fence.lock().await;
        let written = services::commit_patches(self.store.as_ref(), &batch.writes)
            .await
            .map_err(|err| {
                warn!("Paint batch of {} cells not saved", batch.writes.len());
                SessionError::Save(err)
            })?;
        Ok(Some(PaintOutcome {
            staged: batch.staged,
            dropped: batch.dropped,
            written,
        }))
    }

    pub fn cancel_paint(&self) {
        self.state.write().paint.cancel();
    }

    pub fn paint_state(&self) -> PaintState {
        self.state.read().paint.state()
    }

    /// Merge a single edit into one cell and persist it.
    ///
    /// Class status and activity fields obey the same cell rules as painting.
    /// The resulting (status, activity) pair is checked against the policy,
    /// so a half-day class cannot land on a full-day activity either.
    pub async fn edit_entry(&self, key: ScheduleKey, patch: EntryPatch) -> SessionResult<ScheduleEntry> {
        {
            let mut state = self.state.write();
            let Some(kind) = state.cell_kind(&key) else {
                return Err(SessionError::NotEditable(key));
            };
            let writes_status = patch.class_status.is_some();
            let writes_activity = patch.activity.is_some();
            if (writes_status && !kind.is_paintable(PaintMode::ClassStatus))
                || (writes_activity && !kind.is_paintable(PaintMode::Activity))
            {
                return Err(SessionError::NotEditable(key));
            }
            if writes_status || writes_activity {
                let current = state.schedule.entry_or_default(&key);
                let status = patch.class_status.unwrap_or(current.class_status);
                let activity = patch.activity.as_deref().unwrap_or(&current.activity);
                let candidate = state.catalog.lookup(activity);
                if let Err(reason) = self.policy.check_activity_write(key.date, status, candidate) {
                    return Err(SessionError::Rejected { key, reason });
                }
            }
            state.schedule.apply_patch(key.clone(), &patch);
        }

        services::upsert_entry(self.store.as_ref(), &key, &patch)
            .await
            .map_err(|source| SessionError::Upsert { key, source })
    }

    pub async fn set_secondary_info(
        &self,
        key: ScheduleKey,
        info: impl Into<String>,
    ) -> SessionResult<ScheduleEntry> {
        self.edit_entry(key, EntryPatch::secondary_info(info)).await
    }

    // ==================== Read-only views ====================

    /// Groups in grid order (by arrival).
    pub fn groups(&self) -> Vec<Group> {
        let mut groups = self.state.read().groups.clone();
        sort_by_arrival(&mut groups);
        groups
    }

    pub fn window(&self) -> Option<DateRange> {
        self.state.read().window
    }

    pub fn schedule(&self) -> ScheduleMap {
        self.state.read().schedule.clone()
    }

    pub fn entry(&self, key: &ScheduleKey) -> ScheduleEntry {
        self.state.read().schedule.entry_or_default(key)
    }

    /// Load diagnostics followed by those of the latest auto-schedule and
    /// orientation runs.
    pub fn diagnostics(&self) -> Diagnostics {
        let state = self.state.read();
        let mut all = state.diagnostics.clone();
        all.extend(state.auto_schedule_diagnostics.clone());
        all.extend(state.orientation_diagnostics.clone());
        all
    }

    pub fn cell_kind(&self, key: &ScheduleKey) -> Option<CellKind> {
        self.state.read().cell_kind(key)
    }

    pub fn total_hours(&self) -> BTreeMap<GroupId, u32> {
        let state = self.state.read();
        total_hours(&state.groups, &state.schedule, self.policy.as_ref())
    }

    pub fn group_hours(&self, group_id: &GroupId) -> Option<u32> {
        let state = self.state.read();
        state
            .groups
            .iter()
            .find(|g| &g.id == group_id)
            .map(|group| group_hours(group, &state.schedule, self.policy.as_ref()))
    }

    /// AM/PM/unassigned headcounts for every day of the window.
    pub fn daily_headcounts(&self) -> Vec<SessionHeadcount> {
        let state = self.state.read();
        match state.window {
            Some(window) => daily_headcounts(&state.groups, &state.schedule, &window, self.policy.as_ref()),
            None => Vec::new(),
        }
    }

    pub fn itinerary(&self, group_id: &GroupId) -> Option<Vec<ItineraryDay>> {
        let state = self.state.read();
        state
            .groups
            .iter()
            .find(|g| &g.id == group_id)
            .map(|group| group_itinerary(group, &state.schedule, self.policy.as_ref()))
    }
}

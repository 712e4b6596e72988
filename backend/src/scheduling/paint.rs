//! Interactive paint gestures over the schedule grid.
//!
//! A gesture starts on the first cell, stages one [`CellUpdate`] per cell the
//! pointer enters and ends on release. Each staged cell is applied to the live
//! view straight away when the policy allows it; on release every staged cell
//! is checked again against the schedule as it was when the gesture started,
//! and the survivors form one batch for the store.

use std::collections::BTreeMap;

use super::policy::{SchedulePolicy, WriteVerdict};
use crate::models::{ActivityCatalog, CellUpdate, EntryPatch, PaintMode, ScheduleKey, ScheduleMap};

/// Check a cell update against `schedule`.
///
/// Class-status writes are always allowed; activity writes go through the policy.
pub fn validate_cell_update<P>(
    schedule: &ScheduleMap,
    key: &ScheduleKey,
    update: &CellUpdate,
    catalog: &ActivityCatalog,
    policy: &P,
) -> WriteVerdict
where
    P: SchedulePolicy + ?Sized,
{
    match update {
        CellUpdate::Class(_) => Ok(()),
        CellUpdate::Activity(name) => {
            policy.check_activity_write(key.date, schedule.status(key), catalog.lookup(name))
        }
    }
}

/// Validate and apply one update to the live view. Returns whether the cell changed.
pub fn apply_cell_update<P>(
    schedule: &mut ScheduleMap,
    key: &ScheduleKey,
    update: &CellUpdate,
    catalog: &ActivityCatalog,
    policy: &P,
) -> bool
where
    P: SchedulePolicy + ?Sized,
{
    match validate_cell_update(schedule, key, update, catalog, policy) {
        Ok(()) => schedule.apply_patch(key.clone(), &update.to_patch()),
        Err(rejection) => {
            log::debug!("Skipping local update at {key}: {rejection}");
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintState {
    Idle,
    Painting,
}

/// Writes that survived the release-time check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaintBatch {
    pub writes: Vec<(ScheduleKey, EntryPatch)>,
    /// Cells staged during the gesture.
    pub staged: usize,
    /// Staged cells refused at release.
    pub dropped: usize,
}

impl PaintBatch {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[derive(Debug)]
struct Gesture {
    mode: PaintMode,
    snapshot: ScheduleMap,
    staged: BTreeMap<ScheduleKey, CellUpdate>,
}

/// Idle/Painting state machine for one operator.
#[derive(Debug, Default)]
pub struct PaintSession {
    gesture: Option<Gesture>,
}

impl PaintSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PaintState {
        if self.gesture.is_some() {
            PaintState::Painting
        } else {
            PaintState::Idle
        }
    }

    pub fn is_painting(&self) -> bool {
        self.gesture.is_some()
    }

    /// Mode of the gesture in progress.
    pub fn mode(&self) -> Option<PaintMode> {
        self.gesture.as_ref().map(|g| g.mode)
    }

    pub fn staged_len(&self) -> usize {
        self.gesture.as_ref().map_or(0, |g| g.staged.len())
    }

    pub fn staged(&self, key: &ScheduleKey) -> Option<&CellUpdate> {
        self.gesture.as_ref().and_then(|g| g.staged.get(key))
    }

    /// Start a gesture on `key`, snapshotting `schedule` first.
    ///
    /// An unfinished gesture is discarded. Returns whether the live cell changed.
    pub fn begin<P>(
        &mut self,
        key: ScheduleKey,
        update: CellUpdate,
        schedule: &mut ScheduleMap,
        catalog: &ActivityCatalog,
        policy: &P,
    ) -> bool
    where
        P: SchedulePolicy + ?Sized,
    {
        if let Some(previous) = self.gesture.take() {
            log::debug!(
                "Discarding unfinished paint gesture with {} staged cells",
                previous.staged.len()
            );
        }

        let snapshot = schedule.clone();
        let applied = apply_cell_update(schedule, &key, &update, catalog, policy);
        let mode = update.mode();
        self.gesture = Some(Gesture {
            mode,
            snapshot,
            staged: BTreeMap::from([(key, update)]),
        });
        applied
    }

    /// Stage `update` on another cell of the current gesture.
    ///
    /// Ignored when idle, when the update's mode differs from the gesture's, or
    /// when the cell already holds the same staged value.
    pub fn extend<P>(
        &mut self,
        key: ScheduleKey,
        update: CellUpdate,
        schedule: &mut ScheduleMap,
        catalog: &ActivityCatalog,
        policy: &P,
    ) -> bool
    where
        P: SchedulePolicy + ?Sized,
    {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        if update.mode() != gesture.mode {
            log::debug!("Ignoring {:?} update during {:?} gesture", update.mode(), gesture.mode);
            return false;
        }
        if gesture.staged.get(&key) == Some(&update) {
            return false;
        }

        let applied = apply_cell_update(schedule, &key, &update, catalog, policy);
        gesture.staged.insert(key, update);
        applied
    }

    /// End the gesture and build the batch to persist.
    ///
    /// Returns `None` when no gesture was in progress. The staged cells are
    /// cleared either way.
    pub fn finish<P>(&mut self, catalog: &ActivityCatalog, policy: &P) -> Option<PaintBatch>
    where
        P: SchedulePolicy + ?Sized,
    {
        let gesture = self.gesture.take()?;
        let staged = gesture.staged.len();
        let mut writes = Vec::with_capacity(staged);

        for (key, update) in gesture.staged {
            match validate_cell_update(&gesture.snapshot, &key, &update, catalog, policy) {
                Ok(()) => writes.push((key, update.to_patch())),
                Err(rejection) => log::debug!("Dropping {key} from batch: {rejection}"),
            }
        }

        let dropped = staged - writes.len();
        Some(PaintBatch {
            writes,
            staged,
            dropped,
        })
    }

    /// Abandon the gesture without producing a batch.
    pub fn cancel(&mut self) {
        self.gesture = None;
    }
}

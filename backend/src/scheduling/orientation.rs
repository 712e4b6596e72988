//! Orientation day placement.

use chrono::{Days, NaiveDate};

use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use super::policy::SchedulePolicy;
use super::stay::{compute_stay, Stay};
use crate::models::{ActivityCatalog, EntryPatch, Group, GroupId, ScheduleKey, ScheduleMap};

/// Default name written into the activity field.
pub const ORIENTATION_ACTIVITY: &str = "Orientation";

/// Activity-only writes placing each group's orientation.
#[derive(Debug, Clone, Default)]
pub struct OrientationPlan {
    pub slots: Vec<(ScheduleKey, EntryPatch)>,
    pub diagnostics: Diagnostics,
}

impl OrientationPlan {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_for(&self, group_id: &GroupId) -> Option<NaiveDate> {
        self.slots
            .iter()
            .find(|(key, _)| &key.group_id == group_id)
            .map(|(key, _)| key.date)
    }

    /// Apply the activity writes to `schedule`, keeping existing class statuses.
    pub fn merged_into(&self, schedule: &mut ScheduleMap) -> usize {
        self.slots
            .iter()
            .filter(|(key, patch)| schedule.apply_patch(key.clone(), patch))
            .count()
    }
}

/// First day after arrival, up to and including departure, that holds classes.
pub fn first_orientation_day<P>(stay: &Stay, policy: &P) -> Option<NaiveDate>
where
    P: SchedulePolicy + ?Sized,
{
    let first = stay.arrival().checked_add_days(Days::new(1))?;
    let departure = stay.departure();
    std::iter::successors(Some(first), |day| day.checked_add_days(Days::new(1)))
        .take_while(|day| *day <= departure)
        .find(|day| policy.is_class_day(*day))
}

/// Find every group's orientation slot and check the write against the policy.
///
/// Groups without a slot, or whose slot refuses the write, are skipped with an
/// informational diagnostic.
pub fn find_orientation_slots<P>(
    groups: &[Group],
    existing: &ScheduleMap,
    catalog: &ActivityCatalog,
    policy: &P,
    activity_name: &str,
) -> OrientationPlan
where
    P: SchedulePolicy + ?Sized,
{
    let mut plan = OrientationPlan::default();
    let candidate = catalog.lookup(activity_name);

    for group in groups {
        let stay = compute_stay(group, policy.calendar(), &mut plan.diagnostics);
        if stay.is_inverted() {
            continue;
        }

        let Some(day) = first_orientation_day(&stay, policy) else {
            plan.diagnostics.record(
                Diagnostic::new(
                    DiagnosticKind::NoOrientationSlot,
                    format!(
                        "No weekday between {} and {} for {}",
                        stay.arrival(),
                        stay.departure(),
                        group.id
                    ),
                )
                .for_group(&group.id),
            );
            continue;
        };

        let key = ScheduleKey::new(day, group.id.clone());
        if let Err(rejection) = policy.check_activity_write(day, existing.status(&key), candidate) {
            plan.diagnostics.record(
                Diagnostic::new(
                    DiagnosticKind::RejectedWrite,
                    format!("{activity_name} not placed at {key}: {rejection}"),
                )
                .for_group(&group.id)
                .on(day),
            );
            continue;
        }

        plan.slots.push((key, EntryPatch::activity(activity_name)));
    }

    log::info!(
        "Orientation: {} of {} groups placed",
        plan.slots.len(),
        groups.len()
    );
    plan
}

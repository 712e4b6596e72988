//! Auto-schedule: stays, weekly focus and daily balancing over a date range.

use super::balancer::{balance_day, day_total, DayAllocation, DayCandidate};
use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use super::focus::WeeklyFocus;
use super::policy::SchedulePolicy;
use super::stay::{compute_stay, Stay};
use crate::models::{DateRange, EntryPatch, Group, ScheduleKey, ScheduleMap};

/// Proposed class statuses for every schedulable weekday in the range.
#[derive(Debug, Clone, Default)]
pub struct AutoSchedule {
    /// One entry per (day, present group); activities carried over from the input.
    pub entries: ScheduleMap,
    pub days: Vec<DayAllocation>,
    pub diagnostics: Diagnostics,
}

impl AutoSchedule {
    /// Class-status-only patches, suitable for a merge commit.
    pub fn patches(&self) -> Vec<(ScheduleKey, EntryPatch)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), EntryPatch::class_status(entry.class_status)))
            .collect()
    }

    /// Write the proposed statuses into `schedule`, leaving other fields alone.
    pub fn merged_into(&self, schedule: &mut ScheduleMap) -> usize {
        self.patches()
            .into_iter()
            .filter(|(key, patch)| schedule.apply_patch(key.clone(), patch))
            .count()
    }

    pub fn assigned_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.class_status.credited_hours() > 0)
            .count()
    }
}

struct Roster<'a> {
    group: &'a Group,
    stay: Stay,
    focus: WeeklyFocus,
}

/// Compute a full proposed schedule from the current state.
///
/// Pure: `existing` is only read to carry activity and secondary info over to
/// the proposed entries. Groups are considered in the order given.
pub fn compute_auto_schedule<P>(
    groups: &[Group],
    range: &DateRange,
    existing: &ScheduleMap,
    policy: &P,
) -> AutoSchedule
where
    P: SchedulePolicy + ?Sized,
{
    let mut diagnostics = Diagnostics::new();
    let calendar = policy.calendar();

    let roster: Vec<Roster<'_>> = groups
        .iter()
        .filter_map(|group| {
            let stay = compute_stay(group, calendar, &mut diagnostics);
            if stay.is_inverted() {
                return None;
            }
            Some(Roster {
                group,
                stay,
                focus: WeeklyFocus::for_stay(&stay),
            })
        })
        .collect();

    let mut entries = ScheduleMap::new();
    let mut days = Vec::new();

    for day in range.days().filter(|day| policy.is_class_day(*day)) {
        let candidates: Vec<DayCandidate> = roster
            .iter()
            .filter(|member| member.stay.is_schedulable(day))
            .map(|member| DayCandidate {
                group_id: member.group.id.clone(),
                student_count: member.group.student_count,
                preferred: member.focus.focus_on(day),
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let total = day_total(&candidates);
        let allocation = balance_day(day, &candidates, policy.session_capacity(total));

        for (group_id, status) in &allocation.assignments {
            let key = ScheduleKey::new(day, group_id.clone());
            let mut entry = existing.entry_or_default(&key);
            entry.class_status = *status;
            entries.insert(key, entry);
        }
        for group_id in &allocation.unplaced {
            diagnostics.record(
                Diagnostic::new(
                    DiagnosticKind::SessionFull,
                    format!("Preferred session full on {day}; {group_id} left unassigned"),
                )
                .for_group(group_id)
                .on(day),
            );
        }
        days.push(allocation);
    }

    let schedule = AutoSchedule {
        entries,
        days,
        diagnostics,
    };
    log::info!(
        "Auto-schedule over {} to {}: {} groups, {} class days, {} cells ({} assigned)",
        range.start,
        range.end,
        roster.len(),
        schedule.days.len(),
        schedule.entries.len(),
        schedule.assigned_count()
    );
    schedule
}

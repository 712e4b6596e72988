//! Read-only aggregates over the live schedule.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::policy::SchedulePolicy;
use super::stay::Stay;
use crate::models::{ClassStatus, DateRange, Group, GroupId, ScheduleKey, ScheduleMap};

/// Credited class hours for one group over its schedulable class days.
pub fn group_hours<P>(group: &Group, schedule: &ScheduleMap, policy: &P) -> u32
where
    P: SchedulePolicy + ?Sized,
{
    let stay = Stay::of(group, policy.calendar());
    stay.schedulable_days()
        .filter(|day| policy.is_class_day(*day))
        .map(|day| {
            schedule
                .status(&ScheduleKey::new(day, group.id.clone()))
                .credited_hours()
        })
        .sum()
}

/// Credited hours for every group, keyed by id.
pub fn total_hours<P>(groups: &[Group], schedule: &ScheduleMap, policy: &P) -> BTreeMap<GroupId, u32>
where
    P: SchedulePolicy + ?Sized,
{
    groups
        .iter()
        .map(|group| (group.id.clone(), group_hours(group, schedule, policy)))
        .collect()
}

/// Students in each session on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHeadcount {
    pub date: NaiveDate,
    pub am: u64,
    pub pm: u64,
    pub unassigned: u64,
}

impl SessionHeadcount {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            am: 0,
            pm: 0,
            unassigned: 0,
        }
    }

    fn add(&mut self, status: ClassStatus, students: u32) {
        let students = u64::from(students);
        match status {
            ClassStatus::Morning => self.am += students,
            ClassStatus::Afternoon => self.pm += students,
            ClassStatus::Double => {
                self.am += students;
                self.pm += students;
            }
            ClassStatus::None | ClassStatus::Error => self.unassigned += students,
        }
    }
}

/// Per-day AM/PM/unassigned student totals over `range`.
///
/// Every group whose stay contains the day counts, travel days included.
pub fn daily_headcounts<P>(
    groups: &[Group],
    schedule: &ScheduleMap,
    range: &DateRange,
    policy: &P,
) -> Vec<SessionHeadcount>
where
    P: SchedulePolicy + ?Sized,
{
    let stays: Vec<(&Group, Stay)> = groups
        .iter()
        .map(|group| (group, Stay::of(group, policy.calendar())))
        .collect();

    range
        .days()
        .map(|day| {
            let mut count = SessionHeadcount::empty(day);
            for (group, stay) in &stays {
                if stay.contains(day) {
                    let status = schedule.status(&ScheduleKey::new(day, group.id.clone()));
                    count.add(status, group.student_count);
                }
            }
            count
        })
        .collect()
}

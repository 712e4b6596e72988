//! Date × group grid helpers: cell classification, visible window and row order.

use chrono::NaiveDate;
use serde::Serialize;

use super::policy::SchedulePolicy;
use super::stay::Stay;
use crate::models::{is_weekend, DateRange, Group, PaintMode, ScheduleEntry, ScheduleKey, ScheduleMap};

/// Default days shown before the first arrival and after the last departure.
pub const DEFAULT_WINDOW_PADDING_DAYS: u32 = 7;

/// What a (date, group) cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Arrival,
    Departure,
    OutsideStay,
    Weekend,
    Weekday,
}

impl CellKind {
    /// Whether a paint gesture in `mode` may write this cell.
    pub fn is_paintable(&self, mode: PaintMode) -> bool {
        match self {
            CellKind::Weekday => true,
            CellKind::Weekend => mode == PaintMode::Activity,
            CellKind::Arrival | CellKind::Departure | CellKind::OutsideStay => false,
        }
    }
}

/// Classify a cell. Arrival wins over departure on a same-day stay.
pub fn classify_cell(stay: &Stay, date: NaiveDate) -> CellKind {
    if date == stay.arrival() {
        CellKind::Arrival
    } else if date == stay.departure() {
        CellKind::Departure
    } else if !stay.is_schedulable(date) {
        CellKind::OutsideStay
    } else if is_weekend(date) {
        CellKind::Weekend
    } else {
        CellKind::Weekday
    }
}

/// Earliest arrival minus `padding` to latest departure plus `padding`.
///
/// Inverted stays are ignored; `None` when no group has a usable stay.
pub fn dashboard_window<P>(groups: &[Group], policy: &P, padding: u32) -> Option<DateRange>
where
    P: SchedulePolicy + ?Sized,
{
    let stays = groups
        .iter()
        .map(|group| Stay::of(group, policy.calendar()))
        .filter(|stay| !stay.is_inverted());

    let (start, end) = stays.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, stay| {
        Some(match acc {
            None => (stay.arrival(), stay.departure()),
            Some((start, end)) => (start.min(stay.arrival()), end.max(stay.departure())),
        })
    })?;

    Some(DateRange::new(start, end).padded(padding))
}

/// Grid row order: by arrival instant, ties keep their input order.
pub fn sort_by_arrival(groups: &mut [Group]) {
    groups.sort_by_key(|group| group.arrival);
}

/// One day of a group's stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub date: NaiveDate,
    pub kind: CellKind,
    pub entry: ScheduleEntry,
}

/// Every day of the group's stay with its entry (default when never written).
pub fn group_itinerary<P>(group: &Group, schedule: &ScheduleMap, policy: &P) -> Vec<ItineraryDay>
where
    P: SchedulePolicy + ?Sized,
{
    let stay = Stay::of(group, policy.calendar());
    stay.days()
        .days()
        .map(|date| ItineraryDay {
            date,
            kind: classify_cell(&stay, date),
            entry: schedule.entry_or_default(&ScheduleKey::new(date, group.id.clone())),
        })
        .collect()
}

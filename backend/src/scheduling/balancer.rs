//! Single-day AM/PM allocation.

use chrono::NaiveDate;
use serde::Serialize;

use super::focus::SessionFocus;
use crate::models::{ClassStatus, GroupId};

/// A group present on the day being balanced, with its preferred session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCandidate {
    pub group_id: GroupId,
    pub student_count: u32,
    pub preferred: SessionFocus,
}

impl DayCandidate {
    pub fn new(group_id: impl Into<GroupId>, student_count: u32, preferred: SessionFocus) -> Self {
        Self {
            group_id: group_id.into(),
            student_count,
            preferred,
        }
    }
}

/// Outcome of balancing one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAllocation {
    pub date: NaiveDate,
    pub total_students: u64,
    pub session_cap: u64,
    pub am_students: u64,
    pub pm_students: u64,
    /// Status for every candidate, in roster order.
    pub assignments: Vec<(GroupId, ClassStatus)>,
    /// Groups whose preferred session was already full.
    pub unplaced: Vec<GroupId>,
}

impl DayAllocation {
    pub fn status_of(&self, group_id: &GroupId) -> Option<ClassStatus> {
        self.assignments
            .iter()
            .find(|(id, _)| id == group_id)
            .map(|(_, status)| *status)
    }
}

/// Students present across `candidates`, summed wide enough not to overflow.
pub fn day_total(candidates: &[DayCandidate]) -> u64 {
    candidates.iter().map(|c| u64::from(c.student_count)).sum()
}

/// Greedy single pass over the candidates in the order given.
///
/// Each group is placed in its preferred session if that keeps the session at
/// or below `session_cap`; otherwise it is left at [`ClassStatus::None`]. The
/// other session is never tried and earlier placements are never revisited.
pub fn balance_day(date: NaiveDate, candidates: &[DayCandidate], session_cap: u64) -> DayAllocation {
    let total_students = day_total(candidates);
    let mut am_students: u64 = 0;
    let mut pm_students: u64 = 0;
    let mut assignments = Vec::with_capacity(candidates.len());
    let mut unplaced = Vec::new();

    for candidate in candidates {
        let running = match candidate.preferred {
            SessionFocus::Am => &mut am_students,
            SessionFocus::Pm => &mut pm_students,
        };

        let students = u64::from(candidate.student_count);
        if *running + students <= session_cap {
            *running += students;
            assignments.push((candidate.group_id.clone(), candidate.preferred.class_status()));
        } else {
            log::debug!(
                "{}: {} session full ({} + {} > {}), {} left unassigned",
                date,
                candidate.preferred.as_str(),
                running,
                candidate.student_count,
                session_cap,
                candidate.group_id
            );
            assignments.push((candidate.group_id.clone(), ClassStatus::None));
            unplaced.push(candidate.group_id.clone());
        }
    }

    DayAllocation {
        date,
        total_students,
        session_cap,
        am_students,
        pm_students,
        assignments,
        unplaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_greedy_leaves_second_group_unassigned() {
        let candidates = vec![
            DayCandidate::new("g1", 40, SessionFocus::Am),
            DayCandidate::new("g2", 30, SessionFocus::Am),
        ];
        let allocation = balance_day(monday(), &candidates, 42);

        assert_eq!(allocation.total_students, 70);
        assert_eq!(allocation.status_of(&"g1".into()), Some(ClassStatus::Morning));
        assert_eq!(allocation.status_of(&"g2".into()), Some(ClassStatus::None));
        assert_eq!(allocation.am_students, 40);
        assert_eq!(allocation.pm_students, 0);
        assert_eq!(allocation.unplaced, vec![GroupId::from("g2")]);
    }

    #[test]
    fn test_split_focus_fills_both_sessions() {
        let candidates = vec![
            DayCandidate::new("g1", 40, SessionFocus::Am),
            DayCandidate::new("g2", 30, SessionFocus::Pm),
        ];
        let allocation = balance_day(monday(), &candidates, 42);

        assert_eq!(allocation.status_of(&"g1".into()), Some(ClassStatus::Morning));
        assert_eq!(allocation.status_of(&"g2".into()), Some(ClassStatus::Afternoon));
        assert!(allocation.unplaced.is_empty());
    }

    #[test]
    fn test_later_small_group_can_still_fit() {
        let candidates = vec![
            DayCandidate::new("g1", 40, SessionFocus::Am),
            DayCandidate::new("g2", 30, SessionFocus::Am),
            DayCandidate::new("g3", 10, SessionFocus::Am),
        ];
        // cap 50: g1 fits, g2 does not, g3 still does
        let allocation = balance_day(monday(), &candidates, 50);
        assert_eq!(allocation.status_of(&"g1".into()), Some(ClassStatus::Morning));
        assert_eq!(allocation.status_of(&"g2".into()), Some(ClassStatus::None));
        assert_eq!(allocation.status_of(&"g3".into()), Some(ClassStatus::Morning));
        assert_eq!(allocation.am_students, 50);
    }

    #[test]
    fn test_single_group_never_fits_its_own_cap() {
        let candidates = vec![DayCandidate::new("solo", 20, SessionFocus::Pm)];
        let allocation = balance_day(monday(), &candidates, 12);
        assert_eq!(allocation.status_of(&"solo".into()), Some(ClassStatus::None));
        assert_eq!(allocation.pm_students, 0);
    }

    #[test]
    fn test_empty_day() {
        let allocation = balance_day(monday(), &[], 0);
        assert_eq!(allocation.total_students, 0);
        assert!(allocation.assignments.is_empty());
    }
}

//! Weekly AM/PM focus rotation.
//!
//! Each group starts its stay with a morning focus and flips to the other
//! session every time its schedulable days cross into a new ISO week.

use chrono::{IsoWeek, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stay::Stay;
use crate::models::{iso_week, ClassStatus};

/// Half of the day a group prefers for its classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionFocus {
    #[default]
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl SessionFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionFocus::Am => "AM",
            SessionFocus::Pm => "PM",
        }
    }

    /// Class status written when a group gets its preferred session.
    pub fn class_status(&self) -> ClassStatus {
        match self {
            SessionFocus::Am => ClassStatus::Morning,
            SessionFocus::Pm => ClassStatus::Afternoon,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SessionFocus::Am => SessionFocus::Pm,
            SessionFocus::Pm => SessionFocus::Am,
        }
    }

    fn from_parity(parity: usize) -> Self {
        if parity % 2 == 0 {
            SessionFocus::Am
        } else {
            SessionFocus::Pm
        }
    }
}

/// Focus per ISO week for one group.
///
/// Weeks are keyed by ISO (year, week) so a stay that crosses New Year keeps
/// week 52/53 and week 1 apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyFocus {
    by_week: BTreeMap<IsoWeek, SessionFocus>,
}

impl WeeklyFocus {
    /// Walk `days` in chronological order, flipping focus at every new week.
    pub fn from_days(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut by_week = BTreeMap::new();
        let mut parity = 0usize;
        for day in days {
            let week = iso_week(day);
            if by_week.contains_key(&week) {
                continue;
            }
            if !by_week.is_empty() {
                parity += 1;
            }
            by_week.insert(week, SessionFocus::from_parity(parity));
        }
        Self { by_week }
    }

    /// Focus over the schedulable days of a stay.
    pub fn for_stay(stay: &Stay) -> Self {
        Self::from_days(stay.schedulable_days())
    }

    pub fn get(&self, week: IsoWeek) -> Option<SessionFocus> {
        self.by_week.get(&week).copied()
    }

    /// Focus for the ISO week containing `date`; morning when the week is unknown.
    pub fn focus_on(&self, date: NaiveDate) -> SessionFocus {
        self.get(iso_week(date)).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_week.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IsoWeek, SessionFocus)> + '_ {
        self.by_week.iter().map(|(week, focus)| (*week, *focus))
    }
}

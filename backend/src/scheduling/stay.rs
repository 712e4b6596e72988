//! Presence window of a group on campus.

use chrono::NaiveDate;

use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::models::{Calendar, DateRange, Group};

/// Arrival and departure days of a group, both inclusive.
///
/// The arrival and departure days themselves are travel days; only the days
/// strictly between them are schedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    arrival: NaiveDate,
    departure: NaiveDate,
}

impl Stay {
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Self {
        Self { arrival, departure }
    }

    /// Normalise a group's instants to days in `calendar`.
    pub fn of(group: &Group, calendar: &Calendar) -> Self {
        Self {
            arrival: calendar.day_of(group.arrival),
            departure: calendar.day_of(group.departure),
        }
    }

    pub fn arrival(&self) -> NaiveDate {
        self.arrival
    }

    pub fn departure(&self) -> NaiveDate {
        self.departure
    }

    /// Departure before arrival.
    pub fn is_inverted(&self) -> bool {
        self.departure < self.arrival
    }

    /// Every day from arrival to departure inclusive; empty when inverted.
    pub fn days(&self) -> DateRange {
        DateRange::new(self.arrival, self.departure)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days().contains(date)
    }

    /// Strictly between arrival and departure.
    pub fn is_schedulable(&self, date: NaiveDate) -> bool {
        self.arrival < date && date < self.departure
    }

    /// Days strictly between arrival and departure, in order.
    pub fn schedulable_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days().days().filter(move |day| self.is_schedulable(*day))
    }
}

/// Compute a group's stay, recording a data-quality diagnostic when it is inverted.
///
/// Inverted stays are still returned; they simply have no days.
pub fn compute_stay(group: &Group, calendar: &Calendar, diagnostics: &mut Diagnostics) -> Stay {
    let stay = Stay::of(group, calendar);
    if stay.is_inverted() {
        diagnostics.record(
            Diagnostic::new(
                DiagnosticKind::InvertedStay,
                format!(
                    "Group {} departs ({}) before it arrives ({}); excluded from scheduling",
                    group.id,
                    stay.departure(),
                    stay.arrival()
                ),
            )
            .for_group(&group.id),
        );
    }
    stay
}

//! Eligibility rules for schedule writes.
//!
//! The same policy object is consulted by the auto-scheduler (which days hold
//! classes, how many students a session may take) and by every activity write:
//! interactive painting, paint flushes and orientation assignment.

use chrono::NaiveDate;

use crate::config::SchedulerSettings;
use crate::db::repository::RepositoryResult;
use crate::models::{is_weekend, ActivityCandidate, ActivityType, Calendar, ClassStatus};

/// Default share of the day's students one session may hold.
pub const DEFAULT_SESSION_SHARE_PERCENT: u32 = 60;

/// Why an activity write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteRejection {
    #[error("only full-day activities can be placed on a weekend")]
    HalfDayOnWeekend,

    #[error("unlisted activity cannot be placed on a weekend")]
    UnlistedOnWeekend,

    #[error("full-day activity conflicts with {status} class")]
    FullDayOverHalfDayClass { status: ClassStatus },
}

pub type WriteVerdict = Result<(), WriteRejection>;

/// Decide whether an activity value may be written to a cell.
///
/// * Weekend: only full-day activities, or clearing the cell.
/// * Weekday: anything, except a full-day activity on a cell whose class
///   status is Morning or Afternoon.
pub fn validate_activity_write(
    date: NaiveDate,
    current_status: ClassStatus,
    candidate: ActivityCandidate,
) -> WriteVerdict {
    if is_weekend(date) {
        return match candidate {
            ActivityCandidate::Clear | ActivityCandidate::Listed(ActivityType::FullDay) => Ok(()),
            ActivityCandidate::Listed(ActivityType::HalfDay) => {
                Err(WriteRejection::HalfDayOnWeekend)
            }
            ActivityCandidate::Unlisted => Err(WriteRejection::UnlistedOnWeekend),
        };
    }

    if candidate.is_full_day() && current_status.is_half_day() {
        return Err(WriteRejection::FullDayOverHalfDayClass {
            status: current_status,
        });
    }
    Ok(())
}

/// Boolean form of [`validate_activity_write`].
pub fn is_activity_write_allowed(
    date: NaiveDate,
    current_status: ClassStatus,
    candidate: ActivityCandidate,
) -> bool {
    validate_activity_write(date, current_status, candidate).is_ok()
}

/// Scheduling rules shared by the batch scheduler and the interactive painter.
pub trait SchedulePolicy: Send + Sync {
    /// Calendar used to turn arrival/departure instants into days.
    fn calendar(&self) -> &Calendar;

    /// Days on which classes may be scheduled.
    fn is_class_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date)
    }

    /// Maximum students one session may hold when `total_students` are present.
    fn session_capacity(&self, total_students: u64) -> u64;

    fn check_activity_write(
        &self,
        date: NaiveDate,
        current_status: ClassStatus,
        candidate: ActivityCandidate,
    ) -> WriteVerdict {
        validate_activity_write(date, current_status, candidate)
    }
}

/// Weekday classes, sessions capped at a fixed share of the day's students.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardPolicy {
    calendar: Calendar,
    session_share_percent: u32,
}

impl StandardPolicy {
    pub fn new(calendar: Calendar, session_share_percent: u32) -> Self {
        Self {
            calendar,
            session_share_percent: session_share_percent.min(100),
        }
    }

    pub fn from_settings(settings: &SchedulerSettings) -> RepositoryResult<Self> {
        settings.validate()?;
        Ok(Self::new(settings.calendar()?, settings.session_share_percent))
    }

    pub fn session_share_percent(&self) -> u32 {
        self.session_share_percent
    }
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self::new(Calendar::utc(), DEFAULT_SESSION_SHARE_PERCENT)
    }
}

impl SchedulePolicy for StandardPolicy {
    fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// `floor(total * share / 100)`, computed in integers.
    fn session_capacity(&self, total_students: u64) -> u64 {
        total_students.saturating_mul(u64::from(self.session_share_percent)) / 100
    }
}

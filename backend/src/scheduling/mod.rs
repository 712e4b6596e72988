//! Class scheduling engine.
//!
//! Everything in here is synchronous and side-effect free apart from logging:
//! functions take the groups, the activity catalog and the current
//! [`ScheduleMap`](crate::models::ScheduleMap) by reference and return new
//! values or diagnostics. Persistence is the caller's business (see
//! [`crate::services::dashboard`]).

pub mod balancer;
pub mod diagnostics;
pub mod focus;
pub mod grid;
pub mod hours;
pub mod orientation;
pub mod paint;
pub mod planner;
pub mod policy;
pub mod stay;

pub use balancer::{balance_day, day_total, DayAllocation, DayCandidate};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use focus::{SessionFocus, WeeklyFocus};
pub use grid::{
    classify_cell, dashboard_window, group_itinerary, sort_by_arrival, CellKind, ItineraryDay,
    DEFAULT_WINDOW_PADDING_DAYS,
};
pub use hours::{daily_headcounts, group_hours, total_hours, SessionHeadcount};
pub use orientation::{find_orientation_slots, first_orientation_day, OrientationPlan, ORIENTATION_ACTIVITY};
pub use paint::{apply_cell_update, validate_cell_update, PaintBatch, PaintSession, PaintState};
pub use planner::{compute_auto_schedule, AutoSchedule};
pub use policy::{
    is_activity_write_allowed, validate_activity_write, SchedulePolicy, StandardPolicy,
    WriteRejection, WriteVerdict, DEFAULT_SESSION_SHARE_PERCENT,
};
pub use stay::{compute_stay, Stay};

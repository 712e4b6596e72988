//! Service layer: session objects that combine the scheduling core with a store.

pub mod dashboard;

pub use dashboard::{
    AutoScheduleOutcome, DashboardSession, LoadSummary, OrientationOutcome, PaintOutcome,
    SessionError, SessionResult,
};

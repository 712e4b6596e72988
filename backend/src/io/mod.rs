//! File formats used to seed a store outside of the dashboard.

pub mod snapshot;

pub use snapshot::{CampusSnapshot, SeedSummary};

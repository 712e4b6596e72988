//! # Campus Scheduler
//!
//! Class scheduling engine for student groups staying on a campus.
//!
//! Groups arrive and depart on given days; on every full weekday in between
//! they get a Morning or Afternoon class session, with each session capped at
//! a share of the day's students and each group's preferred session rotating
//! week over week. Activities (half-day or full-day) are painted onto the same
//! date × group grid, subject to eligibility rules that keep full-day
//! activities off half-day class slots and half-day activities off weekends.
//!
//! ## Architecture
//!
//! - [`models`]: groups, activities, schedule entries and calendar helpers
//! - [`scheduling`]: the pure engine (stays, weekly focus, balancer, policy,
//!   paint sessions, orientation, hours)
//! - [`db`]: storage trait, in-memory store and document-id codec
//! - [`services`]: [`DashboardSession`](services::DashboardSession), the
//!   stateful operator session tying the engine to a store
//! - [`config`]: `campus.toml` settings
//! - [`io`]: JSON campus snapshots for seeding a store

// RepositoryError carries a context struct on every variant.
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod io;
pub mod models;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use services::{DashboardSession, SessionError};

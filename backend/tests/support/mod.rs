//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use campus_scheduler::config::AppConfig;
use campus_scheduler::db::LocalRepository;
use campus_scheduler::models::{Activity, ActivityType, CampusId, Group, ScheduleKey};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const CAMPUS: &str = "north";

/// Day of June 2024. The 1st is a Saturday; Mondays are 3, 10, 17 and 24.
pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

pub fn june_at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

pub fn key(day: u32, group: &str) -> ScheduleKey {
    ScheduleKey::new(june(day), group)
}

/// Group on the test campus, arriving in the afternoon and leaving in the morning.
pub fn group(id: &str, students: u32, arrival: u32, departure: u32) -> Group {
    Group::new(id, students, june_at(arrival, 15), june_at(departure, 9))
        .with_name(format!("Group {id}"))
        .with_campus("NORTH")
}

pub fn activities() -> Vec<Activity> {
    vec![
        Activity::new("a1", "Orientation", ActivityType::HalfDay),
        Activity::new("a2", "Excursion", ActivityType::FullDay),
        Activity::new("a3", "Museum", ActivityType::HalfDay),
    ]
}

/// G1 (40) and G2 (30) stay Sunday 2nd to Saturday 8th; G3 (10) Friday 7th to
/// Monday 10th; "elsewhere" belongs to another campus.
pub fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.add_group(group("G1", 40, 2, 8));
    repo.add_group(group("G2", 30, 2, 8));
    repo.add_group(group("G3", 10, 7, 10));
    repo.add_group(
        Group::new("elsewhere", 50, june_at(3, 10), june_at(9, 10)).with_campus(CampusId::from("SOUTH")),
    );
    for activity in activities() {
        repo.add_activity(activity);
    }
    repo
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.campus.id = CampusId::from(CAMPUS);
    config
}

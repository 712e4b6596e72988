//! Campus planner
//!
//! Loads a campus snapshot into the in-memory store, runs the auto-scheduler
//! and orientation placement, then prints the resulting hours and daily
//! session headcounts as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin campus-planner -- demos/snapshot.json
//! CAMPUS_CONFIG=campus.toml RUST_LOG=debug cargo run --bin campus-planner -- demos/snapshot.json
//! ```
//!
//! # Environment Variables
//!
//! - `CAMPUS_CONFIG`: path to the configuration file (default: search for `campus.toml`)
//! - `RUST_LOG`: log level (default: info)

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use campus_scheduler::config::AppConfig;
use campus_scheduler::db::LocalRepository;
use campus_scheduler::io::CampusSnapshot;
use campus_scheduler::services::DashboardSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let snapshot_path = env::args()
        .nth(1)
        .context("usage: campus-planner <snapshot.json>")?;

    let config = AppConfig::from_env_or_default().context("Failed to load configuration")?;
    info!("Planning campus {}", config.campus.id);

    let repo = LocalRepository::new();
    let seeded = CampusSnapshot::from_file(&snapshot_path)?.seed(&repo);
    if seeded.skipped_groups > 0 {
        warn!("{} groups skipped for missing dates", seeded.skipped_groups);
    }

    let session = DashboardSession::new(Arc::new(repo), &config)
        .context("Invalid scheduler settings")?;
    let summary = session.load().await?;
    info!(
        "Window {:?}, {} groups, {} existing entries",
        summary.window, summary.groups, summary.entries
    );

    if let Some(outcome) = session.run_auto_schedule().await? {
        info!(
            "Auto-schedule: {} class days, {} assigned, {} unassigned",
            outcome.class_days, outcome.assigned, outcome.unassigned
        );
    }
    if let Some(outcome) = session.assign_orientations().await? {
        info!(
            "Orientation: {} placed, {} skipped",
            outcome.placed, outcome.skipped
        );
    }

    let diagnostics = session.diagnostics();
    if !diagnostics.is_empty() {
        info!("{} diagnostics recorded", diagnostics.len());
    }

    let report = serde_json::json!({
        "campus": config.campus.id,
        "window": session.window(),
        "totalHours": session.total_hours(),
        "dailyHeadcounts": session.daily_headcounts(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

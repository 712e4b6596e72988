//! Storage boundary.
//!
//! ```text
//! DashboardSession ──▶ services (ScheduleKey ⇄ document id) ──▶ ScheduleStore
//!                                                                   │
//!                                                        LocalRepository (in-memory)
//! ```
//!
//! - `repository`: the [`ScheduleStore`] trait and [`RepositoryError`]
//! - `repositories::local`: in-memory implementation
//! - `keys`: `YYYY-MM-DD_<groupId>` document ids
//! - `services`: functions the rest of the crate should call

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one schedule store backend feature.");

pub mod keys;
pub mod repositories;
pub mod repository;
pub mod services;

pub use keys::{decode_key, encode_key, KeyError};
pub use repositories::LocalRepository;
pub use repository::{
    DocumentWrite, ErrorContext, RepositoryError, RepositoryResult, ScheduleDocuments, ScheduleStore,
};
pub use services::{commit_patches, health_check, load_schedule, upsert_entry};

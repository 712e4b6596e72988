//! Storage trait and error types.

pub mod error;
pub mod store;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use store::{DocumentWrite, ScheduleDocuments, ScheduleStore};

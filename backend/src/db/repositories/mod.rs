//! Schedule store implementations.
//!
//! - `local`: in-memory store for tests and local runs
pub mod local;

pub use local::LocalRepository;

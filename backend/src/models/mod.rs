//! Domain types shared by the scheduling core and the storage layer.

pub mod activity;
pub mod group;
pub mod macros;
pub mod schedule;
pub mod time;

pub use activity::*;
pub use group::*;
pub use schedule::*;
pub use time::*;

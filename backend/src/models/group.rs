//! Student groups staying on a campus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_string_id!(GroupId);
crate::define_string_id!(CampusId);

fn default_group_name() -> String {
    "Unnamed Group".to_string()
}

fn default_client() -> String {
    "Unknown".to_string()
}

/// A group of students, read-only from the scheduler's point of view.
///
/// Arrival and departure are instants; the scheduler only ever looks at the
/// calendar day they fall on (see [`crate::models::Calendar`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default = "default_group_name")]
    pub name: String,
    /// Client / agency label.
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default)]
    pub student_count: u32,
    #[serde(default)]
    pub leader_count: u32,
    pub arrival: DateTime<Utc>,
    pub departure: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus_id: Option<CampusId>,
}

impl Group {
    pub fn new(
        id: impl Into<GroupId>,
        student_count: u32,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            client: default_client(),
            student_count,
            leader_count: 0,
            arrival,
            departure,
            campus_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_campus(mut self, campus: impl Into<CampusId>) -> Self {
        self.campus_id = Some(campus.into());
        self
    }

    /// Case-insensitive campus match; groups without a campus never match.
    pub fn belongs_to(&self, campus: &CampusId) -> bool {
        self.campus_id
            .as_ref()
            .is_some_and(|c| c.as_str().eq_ignore_ascii_case(campus.as_str()))
    }
}

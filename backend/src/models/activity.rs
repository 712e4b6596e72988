//! Activities that can be painted onto schedule cells.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_string_id!(ActivityId);

/// How much of a day an activity occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityType {
    #[default]
    HalfDay,
    FullDay,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::HalfDay => "half-day",
            ActivityType::FullDay => "full-day",
        }
    }

    /// Anything other than `"full-day"` is treated as half-day.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("full-day") {
            ActivityType::FullDay
        } else {
            ActivityType::HalfDay
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub activity_type: ActivityType,
}

impl Activity {
    pub fn new(id: impl Into<ActivityId>, name: impl Into<String>, activity_type: ActivityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
            activity_type,
        }
    }

    pub fn is_full_day(&self) -> bool {
        self.activity_type == ActivityType::FullDay
    }
}

/// What a candidate activity value resolves to in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCandidate {
    /// Empty value: the write clears the cell's activity.
    Clear,
    /// A name found in the catalog.
    Listed(ActivityType),
    /// A non-empty name the catalog does not know.
    Unlisted,
}

impl ActivityCandidate {
    pub fn is_full_day(&self) -> bool {
        matches!(self, ActivityCandidate::Listed(ActivityType::FullDay))
    }
}

/// Activity list indexed by name. The first activity registered under a name wins.
#[derive(Debug, Clone, Default)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
    by_name: HashMap<String, ActivityType>,
}

impl ActivityCatalog {
    pub fn new(activities: Vec<Activity>) -> Self {
        let mut by_name = HashMap::with_capacity(activities.len());
        for activity in &activities {
            by_name
                .entry(activity.name.clone())
                .or_insert(activity.activity_type);
        }
        Self { activities, by_name }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn type_of(&self, name: &str) -> Option<ActivityType> {
        self.by_name.get(name).copied()
    }

    /// Resolve a candidate activity value for validation.
    pub fn lookup(&self, name: &str) -> ActivityCandidate {
        if name.is_empty() {
            return ActivityCandidate::Clear;
        }
        match self.type_of(name) {
            Some(activity_type) => ActivityCandidate::Listed(activity_type),
            None => ActivityCandidate::Unlisted,
        }
    }
}

impl From<Vec<Activity>> for ActivityCatalog {
    fn from(activities: Vec<Activity>) -> Self {
        Self::new(activities)
    }
}

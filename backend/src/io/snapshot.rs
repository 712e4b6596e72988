//! JSON campus snapshots.
//!
//! A snapshot holds the three collections the dashboard reads, in their stored
//! document shape:
//!
//! ```json
//! {
//!   "groups": [{ "id": "g1", "groupName": "Lycée Hugo", "Client": "EduTours",
//!                "studentCount": 40, "leaderCount": 4, "campusId": "NORTH",
//!                "arrivalDate": "2024-06-02T15:00:00Z",
//!                "departureDate": "2024-06-15T09:00:00Z" }],
//!   "activities": [{ "id": "a1", "name": "Excursion", "type": "full-day" }],
//!   "schedule": { "2024-06-03_g1": { "classStatus": "Morning", "activity": "" } }
//! }
//! ```
//!
//! Group documents without both timestamps are skipped with a warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::db::repositories::LocalRepository;
use crate::models::{Activity, ActivityType, CampusId, Group, GroupId, ScheduleEntry};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampusSnapshot {
    #[serde(default)]
    pub groups: Vec<GroupDocument>,
    #[serde(default)]
    pub activities: Vec<ActivityDocument>,
    #[serde(default)]
    pub schedule: BTreeMap<String, ScheduleEntry>,
}

/// Group as stored, before required fields are checked.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDocument {
    pub id: String,
    #[serde(rename = "groupName")]
    pub group_name: Option<String>,
    #[serde(rename = "Client")]
    pub client: Option<String>,
    #[serde(rename = "studentCount", default)]
    pub student_count: u32,
    #[serde(rename = "leaderCount", default)]
    pub leader_count: u32,
    #[serde(rename = "arrivalDate")]
    pub arrival_date: Option<DateTime<Utc>>,
    #[serde(rename = "departureDate")]
    pub departure_date: Option<DateTime<Utc>>,
    #[serde(rename = "campusId")]
    pub campus_id: Option<String>,
}

impl GroupDocument {
    /// `None` when either timestamp is missing.
    pub fn into_group(self) -> Option<Group> {
        let (Some(arrival), Some(departure)) = (self.arrival_date, self.departure_date) else {
            log::warn!(
                "Group document {} is missing arrivalDate or departureDate; skipped",
                self.id
            );
            return None;
        };
        let mut group = Group::new(GroupId::new(self.id), self.student_count, arrival, departure);
        group.name = self
            .group_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unnamed Group".to_string());
        if let Some(client) = self.client.filter(|c| !c.is_empty()) {
            group.client = client;
        }
        group.leader_count = self.leader_count;
        group.campus_id = self.campus_id.filter(|c| !c.is_empty()).map(CampusId::new);
        Some(group)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub activity_type: String,
}

impl From<ActivityDocument> for Activity {
    fn from(doc: ActivityDocument) -> Self {
        let mut activity = Activity::new(
            doc.id,
            doc.name,
            ActivityType::parse_lenient(&doc.activity_type),
        );
        activity.location = doc.location.filter(|l| !l.is_empty());
        activity
    }
}

/// What a snapshot contributed to a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub groups: usize,
    pub skipped_groups: usize,
    pub activities: usize,
    pub documents: usize,
}

impl CampusSnapshot {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid campus snapshot JSON")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to load snapshot {}", path.display()))
    }

    /// Copy every collection into `repo`.
    pub fn seed(self, repo: &LocalRepository) -> SeedSummary {
        let mut summary = SeedSummary::default();

        for doc in self.groups {
            match doc.into_group() {
                Some(group) => {
                    repo.add_group(group);
                    summary.groups += 1;
                }
                None => summary.skipped_groups += 1,
            }
        }
        for doc in self.activities {
            repo.add_activity(doc.into());
            summary.activities += 1;
        }
        for (doc_id, entry) in self.schedule {
            repo.insert_document(doc_id, entry);
            summary.documents += 1;
        }

        log::info!(
            "Seeded store: {} groups ({} skipped), {} activities, {} schedule documents",
            summary.groups,
            summary.skipped_groups,
            summary.activities,
            summary.documents
        );
        summary
    }
}

//! Per-day, per-group schedule cells.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::group::GroupId;

/// Class session assigned to a group on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassStatus {
    Morning,
    Afternoon,
    Double,
    #[default]
    None,
    Error,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Morning => "Morning",
            ClassStatus::Afternoon => "Afternoon",
            ClassStatus::Double => "Double",
            ClassStatus::None => "None",
            ClassStatus::Error => "Error",
        }
    }

    /// Morning or Afternoon: exactly one half of the day is taken by class.
    pub fn is_half_day(&self) -> bool {
        matches!(self, ClassStatus::Morning | ClassStatus::Afternoon)
    }

    /// Hours of class credited for one day with this status.
    pub fn credited_hours(&self) -> u32 {
        match self {
            ClassStatus::Morning | ClassStatus::Afternoon => 3,
            ClassStatus::Double => 6,
            ClassStatus::None | ClassStatus::Error => 0,
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Morning" => Ok(ClassStatus::Morning),
            "Afternoon" => Ok(ClassStatus::Afternoon),
            "Double" => Ok(ClassStatus::Double),
            "None" | "" => Ok(ClassStatus::None),
            "Error" => Ok(ClassStatus::Error),
            other => Err(format!("Unknown class status: {}", other)),
        }
    }
}

/// Contents of one (date, group) cell.
///
/// A missing entry is equivalent to `ScheduleEntry::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleEntry {
    pub class_status: ClassStatus,
    pub activity: String,
    pub secondary_info: String,
}

impl ScheduleEntry {
    pub fn with_status(class_status: ClassStatus) -> Self {
        Self {
            class_status,
            ..Default::default()
        }
    }

    pub fn with_activity(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            ..Default::default()
        }
    }
}

/// Partial write with merge semantics: `None` fields leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_status: Option<ClassStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_info: Option<String>,
}

impl EntryPatch {
    pub fn class_status(status: ClassStatus) -> Self {
        Self {
            class_status: Some(status),
            ..Default::default()
        }
    }

    pub fn activity(name: impl Into<String>) -> Self {
        Self {
            activity: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn secondary_info(info: impl Into<String>) -> Self {
        Self {
            secondary_info: Some(info.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.class_status.is_none() && self.activity.is_none() && self.secondary_info.is_none()
    }

    pub fn apply_to(&self, entry: &mut ScheduleEntry) {
        if let Some(status) = self.class_status {
            entry.class_status = status;
        }
        if let Some(ref activity) = self.activity {
            entry.activity = activity.clone();
        }
        if let Some(ref info) = self.secondary_info {
            entry.secondary_info = info.clone();
        }
    }
}

/// Structured address of a schedule cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleKey {
    pub date: NaiveDate,
    pub group_id: GroupId,
}

impl ScheduleKey {
    pub fn new(date: NaiveDate, group_id: impl Into<GroupId>) -> Self {
        Self {
            date,
            group_id: group_id.into(),
        }
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date, self.group_id)
    }
}

/// Which field a paint gesture writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintMode {
    ClassStatus,
    Activity,
}

/// A single staged cell edit: either a class status or an activity name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellUpdate {
    Class(ClassStatus),
    Activity(String),
}

impl CellUpdate {
    pub fn mode(&self) -> PaintMode {
        match self {
            CellUpdate::Class(_) => PaintMode::ClassStatus,
            CellUpdate::Activity(_) => PaintMode::Activity,
        }
    }

    pub fn to_patch(&self) -> EntryPatch {
        match self {
            CellUpdate::Class(status) => EntryPatch::class_status(*status),
            CellUpdate::Activity(name) => EntryPatch::activity(name.clone()),
        }
    }
}

/// Sparse in-memory schedule view, ordered by date then group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleMap {
    entries: BTreeMap<ScheduleKey, ScheduleEntry>,
}

impl ScheduleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ScheduleKey) -> Option<&ScheduleEntry> {
        self.entries.get(key)
    }

    /// Entry at `key`, or the default entry when the cell has never been written.
    pub fn entry_or_default(&self, key: &ScheduleKey) -> ScheduleEntry {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    pub fn status(&self, key: &ScheduleKey) -> ClassStatus {
        self.entries
            .get(key)
            .map(|entry| entry.class_status)
            .unwrap_or_default()
    }

    pub fn insert(&mut self, key: ScheduleKey, entry: ScheduleEntry) -> Option<ScheduleEntry> {
        self.entries.insert(key, entry)
    }

    /// Merge a patch into the cell, creating a default entry first if needed.
    /// Returns `true` when the stored entry changed.
    pub fn apply_patch(&mut self, key: ScheduleKey, patch: &EntryPatch) -> bool {
        let entry = self.entries.entry(key).or_default();
        let before = entry.clone();
        patch.apply_to(entry);
        *entry != before
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ScheduleKey, ScheduleEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, ScheduleKey, ScheduleEntry> {
        self.entries.keys()
    }
}

impl FromIterator<(ScheduleKey, ScheduleEntry)> for ScheduleMap {
    fn from_iter<T: IntoIterator<Item = (ScheduleKey, ScheduleEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ScheduleMap {
    type Item = (ScheduleKey, ScheduleEntry);
    type IntoIter = btree_map::IntoIter<ScheduleKey, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScheduleMap {
    type Item = (&'a ScheduleKey, &'a ScheduleEntry);
    type IntoIter = btree_map::Iter<'a, ScheduleKey, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

//! Document ids of schedule entries.
//!
//! Stored ids have the form `YYYY-MM-DD_<groupId>`. The first `_` separates
//! the date; the group id may itself contain underscores.

use chrono::NaiveDate;

use crate::models::ScheduleKey;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("document id '{0}' has no date separator")]
    MissingSeparator(String),
    #[error("document id '{0}' does not start with a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("document id '{0}' has an empty group id")]
    EmptyGroup(String),
}

pub fn encode_key(key: &ScheduleKey) -> String {
    format!("{}{}{}", key.date.format(DATE_FORMAT), SEPARATOR, key.group_id)
}

pub fn decode_key(doc_id: &str) -> Result<ScheduleKey, KeyError> {
    let (date, group) = doc_id
        .split_once(SEPARATOR)
        .ok_or_else(|| KeyError::MissingSeparator(doc_id.to_string()))?;
    if group.is_empty() {
        return Err(KeyError::EmptyGroup(doc_id.to_string()));
    }
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| KeyError::InvalidDate(doc_id.to_string()))?;
    Ok(ScheduleKey::new(date, group))
}

/// Split a document id into its raw date text and group id without parsing the date.
pub(crate) fn split_doc_id(doc_id: &str) -> Option<(&str, &str)> {
    doc_id.split_once(SEPARATOR)
}

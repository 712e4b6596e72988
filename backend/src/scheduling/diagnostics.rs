//! Data-quality and run diagnostics.
//!
//! Problems found while computing a schedule never abort the run: the affected
//! group or cell is left out and a [`Diagnostic`] is recorded instead.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::GroupId;

/// How loudly a diagnostic should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Departure falls before arrival.
    InvertedStay,
    /// A stored document id could not be decoded into a (date, group) key.
    MalformedKey,
    /// No weekday between arrival and departure to hold the orientation.
    NoOrientationSlot,
    /// A write was refused by the schedule policy.
    RejectedWrite,
    /// The preferred session was already at capacity; the group stays unassigned.
    SessionFull,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::InvertedStay | DiagnosticKind::MalformedKey => Severity::Warning,
            DiagnosticKind::NoOrientationSlot
            | DiagnosticKind::RejectedWrite
            | DiagnosticKind::SessionFull => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            group_id: None,
            date: None,
            message: message.into(),
        }
    }

    pub fn for_group(mut self, group_id: &GroupId) -> Self {
        self.group_id = Some(group_id.clone());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Ordered collection of diagnostics produced by one computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it through the log facade.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => log::warn!("{:?}: {}", diagnostic.kind, diagnostic.message),
            Severity::Info => log::debug!("{:?}: {}", diagnostic.kind, diagnostic.message),
        }
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

//! Study planner event model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of planner entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StudyEventType {
    Exam,
    Revision,
    Assignment,
}

impl StudyEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyEventType::Exam => "Exam",
            StudyEventType::Revision => "Revision",
            StudyEventType::Assignment => "Assignment",
        }
    }
}

/// A dated entry in the student's study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyEvent {
    pub id: String,
    pub title: String,
    pub subject: String,
    /// Calendar date only; any time component sent by the backend is dropped.
    #[serde(deserialize_with = "super::serde_helpers::calendar_date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: StudyEventType,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StudyEvent {
    /// Whether this event belongs to the given day's agenda.
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date == day
    }
}

/// Request body for creating a new study event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyEventDraft {
    pub title: String,
    pub subject: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: StudyEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for updating an existing study event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyEventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<StudyEventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StudyEventPatch {
    /// Names of the fields this patch sets, in wire naming.
    pub fn fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("subject", self.subject.is_some()),
            ("date", self.date.is_some()),
            ("type", self.event_type.is_some()),
            ("isCompleted", self.is_completed.is_some()),
            ("isArchived", self.is_archived.is_some()),
            ("notes", self.notes.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// Batch create body for an AI-generated study plan.
#[derive(Debug, Clone, Serialize)]
pub struct StudyEventBatch<'a> {
    pub events: &'a [StudyEventDraft],
}

/// Batch create response.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyEventBatchResponse {
    #[serde(default)]
    pub events: Vec<StudyEvent>,
}

//! Video lesson models.
//!
//! Videos cross the API boundary in snake_case (`VideoRecord`) while screens consume the
//! camelCase `VideoLesson` view-model. The `From` impls below are the only place the two
//! naming schemes meet.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// A video as the backend stores and returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "super::serde_helpers::lenient_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A video lesson as rendered by the video library screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLesson {
    pub id: String,
    pub title: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub is_premium: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Human-formatted upload date, e.g. `Mar 5, 2024`
    pub uploaded_at: String,
}

impl From<VideoRecord> for VideoLesson {
    fn from(record: VideoRecord) -> Self {
        let uploaded_at = format_uploaded_at(record.created_at.as_deref());
        Self {
            id: record.id,
            title: record.title,
            subject: record.subject,
            grade: record.grade,
            description: record.description,
            video_url: record.video_url,
            thumbnail_url: record.thumbnail_url,
            duration: record.duration,
            is_premium: record.is_premium,
            tags: record.tags,
            uploaded_at,
        }
    }
}

/// Format a backend timestamp for display. Unparsable values pass through verbatim.
pub fn format_uploaded_at(created_at: Option<&str>) -> String {
    let Some(raw) = created_at else {
        return String::new();
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

/// New video in view-model naming.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDraft {
    pub title: String,
    pub subject: String,
    pub grade: Option<String>,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub is_premium: bool,
    pub tags: Option<Vec<String>>,
}

/// Partial video update in view-model naming.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub is_premium: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Create body in wire naming.
#[derive(Debug, Clone, Serialize)]
pub struct VideoRecordDraft {
    pub title: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<&VideoDraft> for VideoRecordDraft {
    fn from(draft: &VideoDraft) -> Self {
        Self {
            title: draft.title.clone(),
            subject: draft.subject.clone(),
            grade: draft.grade.clone(),
            description: draft.description.clone(),
            video_url: draft.video_url.clone(),
            thumbnail_url: draft.thumbnail_url.clone(),
            duration: draft.duration.clone(),
            is_premium: draft.is_premium,
            tags: draft.tags.clone(),
        }
    }
}

/// Update body in wire naming.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<&VideoPatch> for VideoRecordPatch {
    fn from(patch: &VideoPatch) -> Self {
        Self {
            title: patch.title.clone(),
            subject: patch.subject.clone(),
            grade: patch.grade.clone(),
            description: patch.description.clone(),
            video_url: patch.video_url.clone(),
            thumbnail_url: patch.thumbnail_url.clone(),
            duration: patch.duration.clone(),
            is_premium: patch.is_premium,
            tags: patch.tags.clone(),
        }
    }
}

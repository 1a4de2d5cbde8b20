//! Dashboard aggregate returned by `GET /dashboard`.

use serde::{Deserialize, Serialize};

use super::StudyEvent;

/// Server-composed landing screen snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAggregate {
    pub user: DashboardUser,
    #[serde(default)]
    pub todays_events: Vec<StudyEvent>,
    #[serde(default)]
    pub recent_bookmarks: Vec<BookmarkSummary>,
    pub progress: DashboardProgress,
}

/// Gamification state of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUser {
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub is_premium: bool,
    /// Ids of bookmarked documents and videos
    #[serde(default)]
    pub bookmarks: Vec<String>,
}

/// A bookmarked item shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Today's completion and level progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProgress {
    #[serde(default)]
    pub today_completed: u32,
    #[serde(default)]
    pub today_total: u32,
    #[serde(default)]
    pub today_percentage: f64,
    #[serde(default)]
    pub level_progress: f64,
    #[serde(default)]
    pub xp_to_next_level: u64,
}

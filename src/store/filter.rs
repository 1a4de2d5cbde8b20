//! Client-side tag filters applied to list responses before they are merged.
//!
//! The backend is expected to filter by tag already; these checks re-verify it because tag
//! arrays can be absent or malformed on individual items.

use crate::models::{Document, ForumPost};

/// Items carrying an optional tag list.
pub trait Tagged {
    fn tags(&self) -> Option<&[String]>;

    fn has_tag(&self, tag: &str) -> bool {
        self.tags()
            .map(|tags| tags.iter().any(|t| t == tag))
            .unwrap_or(false)
    }
}

impl Tagged for Document {
    fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }
}

impl Tagged for ForumPost {
    fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }
}

/// Keep items that carry `tag` (when set) and do not carry `exclude_tag` (when set).
///
/// An item without tags never satisfies `tag` and always satisfies `exclude_tag`.
pub fn retain_by_tags<T: Tagged>(items: Vec<T>, tag: Option<&str>, exclude_tag: Option<&str>) -> Vec<T> {
    let tag = tag.filter(|t| !t.is_empty());
    let exclude_tag = exclude_tag.filter(|t| !t.is_empty());
    if tag.is_none() && exclude_tag.is_none() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| tag.map_or(true, |t| item.has_tag(t)))
        .filter(|item| exclude_tag.map_or(true, |t| !item.has_tag(t)))
        .collect()
}

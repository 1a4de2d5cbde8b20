//! Mutable state behind the store lock.

use std::collections::HashMap;

use super::collection::ResourceCollection;
use super::resource::ResourceKey;
use crate::models::{DashboardAggregate, Document, ForumPost, StudyEvent, User, VideoLesson};

/// One collection per resource type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub(crate) documents: ResourceCollection<Document>,
    pub(crate) videos: ResourceCollection<VideoLesson>,
    pub(crate) forum_posts: ResourceCollection<ForumPost>,
    pub(crate) study_events: ResourceCollection<StudyEvent>,
    pub(crate) users: ResourceCollection<User>,
}

impl Collections {
    pub fn documents(&self) -> &[Document] {
        self.documents.items()
    }

    pub fn videos(&self) -> &[VideoLesson] {
        self.videos.items()
    }

    pub fn forum_posts(&self) -> &[ForumPost] {
        self.forum_posts.items()
    }

    pub fn study_events(&self) -> &[StudyEvent] {
        self.study_events.items()
    }

    pub fn users(&self) -> &[User] {
        self.users.items()
    }
}

/// Loading and error flags for one resource key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStatus {
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped by every `replace`; results tagged with an older value are stale.
    pub(crate) generation: u64,
    /// Requests of the current generation that have not settled yet.
    pub(crate) in_flight: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub collections: Collections,
    pub dashboard: Option<DashboardAggregate>,
    status: HashMap<ResourceKey, ResourceStatus>,
}

impl StoreState {
    pub fn status(&self, key: ResourceKey) -> ResourceStatus {
        self.status.get(&key).cloned().unwrap_or_default()
    }

    /// Mark a request as started and return the generation it belongs to. A new generation
    /// abandons every request still in flight, so only the new one is counted.
    pub fn begin(&mut self, key: ResourceKey, new_generation: bool) -> u64 {
        let status = self.status.entry(key).or_default();
        if new_generation {
            status.generation += 1;
            status.in_flight = 0;
        }
        status.in_flight += 1;
        status.loading = true;
        status.error = None;
        status.generation
    }

    pub fn is_current(&self, key: ResourceKey, generation: u64) -> bool {
        self.status(key).generation == generation
    }

    /// Mark a request of the current generation as finished. The key stays loading while
    /// other requests of the same generation are pending.
    pub fn settle(&mut self, key: ResourceKey, error: Option<String>) {
        let status = self.status.entry(key).or_default();
        status.in_flight = status.in_flight.saturating_sub(1);
        status.loading = status.in_flight > 0;
        status.error = error;
    }

    pub fn clear_error(&mut self, key: ResourceKey) {
        if let Some(status) = self.status.get_mut(&key) {
            status.error = None;
        }
    }

    /// Drop all data and flags. Generations keep counting so in-flight requests issued
    /// before the reset are discarded when they land.
    pub fn reset(&mut self) {
        self.collections = Collections::default();
        self.dashboard = None;
        for status in self.status.values_mut() {
            status.loading = false;
            status.error = None;
            status.generation += 1;
            status.in_flight = 0;
        }
    }
}

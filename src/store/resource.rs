//! Resource keys and the per-type glue between the store, the wire format and the collections.

use chrono::NaiveDate;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::collection::{Keyed, ResourceCollection};
use super::filter::retain_by_tags;
use super::state::Collections;
use super::{reconcile_todays_events, LocalMutation};
use crate::errors::SyncError;
use crate::models::{
    DashboardAggregate, Document, DocumentDraft, DocumentPatch, ForumPost, ForumPostDraft, ForumPostPatch, ListParams,
    StudyEvent, StudyEventDraft, StudyEventPatch, User, UserDraft, UserPatch, VideoDraft,
    VideoLesson, VideoPatch, VideoRecord, VideoRecordDraft, VideoRecordPatch,
};

/// Every piece of state the store tracks loading/error flags for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Documents,
    Videos,
    ForumPosts,
    StudyEvents,
    Users,
    Dashboard,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 6] = [
        ResourceKey::Documents,
        ResourceKey::Videos,
        ResourceKey::ForumPosts,
        ResourceKey::StudyEvents,
        ResourceKey::Users,
        ResourceKey::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKey::Documents => "documents",
            ResourceKey::Videos => "videos",
            ResourceKey::ForumPosts => "forumPosts",
            ResourceKey::StudyEvents => "studyEvents",
            ResourceKey::Users => "users",
            ResourceKey::Dashboard => "dashboard",
        }
    }

    /// REST collection path.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKey::Documents => "/documents",
            ResourceKey::Videos => "/videos",
            ResourceKey::ForumPosts => "/forum-posts",
            ResourceKey::StudyEvents => "/study-events",
            ResourceKey::Users => "/users",
            ResourceKey::Dashboard => "/dashboard",
        }
    }

    /// Path of a single entity. The id is percent-encoded as one path segment.
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), encode_segment(id))
    }

    /// Field holding the item array in a list response.
    pub fn list_field(&self) -> &'static str {
        match self {
            ResourceKey::Documents => "documents",
            ResourceKey::Videos => "videos",
            ResourceKey::ForumPosts => "posts",
            ResourceKey::StudyEvents => "events",
            ResourceKey::Users => "users",
            ResourceKey::Dashboard => "dashboard",
        }
    }
}

/// Percent-encode `segment` so it occupies exactly one path segment.
fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource type held in one of the store's collections.
pub trait Resource: Keyed + Clone + Send + Sync + 'static {
    const KEY: ResourceKey;

    /// Keep the previous items visible while a `replace` is in flight instead of clearing
    /// them up front.
    const DEFER_CLEAR: bool = false;

    /// Decode one entity from its wire representation.
    fn decode(value: Value) -> Result<Self, SyncError>;

    fn collection(collections: &Collections) -> &ResourceCollection<Self>;

    fn collection_mut(collections: &mut Collections) -> &mut ResourceCollection<Self>;

    /// Drop items from a fetched page that do not satisfy `params`.
    fn retain_matching(items: Vec<Self>, _params: &ListParams) -> Vec<Self> {
        items
    }

    /// Keep any copy of this resource embedded in the dashboard in step with a local patch.
    fn reconcile_dashboard(_dashboard: &mut DashboardAggregate, _mutation: &LocalMutation<Self>) {}

    /// Copy of an entity embedded in the dashboard, if this resource appears there.
    fn find_in_dashboard(_dashboard: &DashboardAggregate, _id: &str) -> Option<Self> {
        None
    }
}

/// A resource the mutation gateway can create, update and delete.
pub trait Mutable: Resource {
    type Draft: Sync;
    type Patch: Sync;

    fn draft_body(draft: &Self::Draft) -> Result<Value, SyncError>;

    fn patch_body(patch: &Self::Patch) -> Result<Value, SyncError>;

    /// Calendar date the entity is scheduled on, for date-scoped invalidation.
    fn event_date(&self) -> Option<NaiveDate> {
        None
    }

    /// Wire names of the fields a patch sets.
    fn patched_fields(_patch: &Self::Patch) -> Vec<&'static str> {
        Vec::new()
    }
}

fn decode_json<T: DeserializeOwned>(value: Value) -> Result<T, SyncError> {
    Ok(serde_json::from_value(value)?)
}

fn encode_json<T: Serialize>(body: &T) -> Result<Value, SyncError> {
    Ok(serde_json::to_value(body)?)
}

impl Keyed for Document {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Document {
    const KEY: ResourceKey = ResourceKey::Documents;

    fn decode(value: Value) -> Result<Self, SyncError> {
        decode_json(value)
    }

    fn collection(collections: &Collections) -> &ResourceCollection<Self> {
        &collections.documents
    }

    fn collection_mut(collections: &mut Collections) -> &mut ResourceCollection<Self> {
        &mut collections.documents
    }

    fn retain_matching(items: Vec<Self>, params: &ListParams) -> Vec<Self> {
        retain_by_tags(items, params.tag.as_deref(), params.exclude_tag.as_deref())
    }
}

impl Mutable for Document {
    type Draft = DocumentDraft;
    type Patch = DocumentPatch;

    fn draft_body(draft: &DocumentDraft) -> Result<Value, SyncError> {
        encode_json(draft)
    }

    fn patch_body(patch: &DocumentPatch) -> Result<Value, SyncError> {
        encode_json(patch)
    }
}

impl Keyed for VideoLesson {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for VideoLesson {
    const KEY: ResourceKey = ResourceKey::Videos;
    const DEFER_CLEAR: bool = true;

    fn decode(value: Value) -> Result<Self, SyncError> {
        decode_json::<VideoRecord>(value).map(VideoLesson::from)
    }

    fn collection(collections: &Collections) -> &ResourceCollection<Self> {
        &collections.videos
    }

    fn collection_mut(collections: &mut Collections) -> &mut ResourceCollection<Self> {
        &mut collections.videos
    }
}

impl Mutable for VideoLesson {
    type Draft = VideoDraft;
    type Patch = VideoPatch;

    fn draft_body(draft: &VideoDraft) -> Result<Value, SyncError> {
        encode_json(&VideoRecordDraft::from(draft))
    }

    fn patch_body(patch: &VideoPatch) -> Result<Value, SyncError> {
        encode_json(&VideoRecordPatch::from(patch))
    }
}

impl Keyed for ForumPost {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for ForumPost {
    const KEY: ResourceKey = ResourceKey::ForumPosts;

    fn decode(value: Value) -> Result<Self, SyncError> {
        decode_json(value)
    }

    fn collection(collections: &Collections) -> &ResourceCollection<Self> {
        &collections.forum_posts
    }

    fn collection_mut(collections: &mut Collections) -> &mut ResourceCollection<Self> {
        &mut collections.forum_posts
    }

    fn retain_matching(items: Vec<Self>, params: &ListParams) -> Vec<Self> {
        retain_by_tags(items, params.tag.as_deref(), params.exclude_tag.as_deref())
    }
}

impl Mutable for ForumPost {
    type Draft = ForumPostDraft;
    type Patch = ForumPostPatch;

    fn draft_body(draft: &ForumPostDraft) -> Result<Value, SyncError> {
        encode_json(draft)
    }

    fn patch_body(patch: &ForumPostPatch) -> Result<Value, SyncError> {
        encode_json(patch)
    }
}

impl Keyed for StudyEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for StudyEvent {
    const KEY: ResourceKey = ResourceKey::StudyEvents;
    const DEFER_CLEAR: bool = true;

    fn decode(value: Value) -> Result<Self, SyncError> {
        decode_json(value)
    }

    fn collection(collections: &Collections) -> &ResourceCollection<Self> {
        &collections.study_events
    }

    fn collection_mut(collections: &mut Collections) -> &mut ResourceCollection<Self> {
        &mut collections.study_events
    }

    fn reconcile_dashboard(dashboard: &mut DashboardAggregate, mutation: &LocalMutation<Self>) {
        reconcile_todays_events(dashboard, mutation);
    }

    fn find_in_dashboard(dashboard: &DashboardAggregate, id: &str) -> Option<Self> {
        dashboard.todays_events.iter().find(|e| e.id == id).cloned()
    }
}

impl Mutable for StudyEvent {
    type Draft = StudyEventDraft;
    type Patch = StudyEventPatch;

    fn draft_body(draft: &StudyEventDraft) -> Result<Value, SyncError> {
        encode_json(draft)
    }

    fn patch_body(patch: &StudyEventPatch) -> Result<Value, SyncError> {
        encode_json(patch)
    }

    fn event_date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn patched_fields(patch: &StudyEventPatch) -> Vec<&'static str> {
        patch.fields()
    }
}

impl Keyed for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for User {
    const KEY: ResourceKey = ResourceKey::Users;

    fn decode(value: Value) -> Result<Self, SyncError> {
        decode_json(value)
    }

    fn collection(collections: &Collections) -> &ResourceCollection<Self> {
        &collections.users
    }

    fn collection_mut(collections: &mut Collections) -> &mut ResourceCollection<Self> {
        &mut collections.users
    }
}

impl Mutable for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    fn draft_body(draft: &UserDraft) -> Result<Value, SyncError> {
        encode_json(draft)
    }

    fn patch_body(patch: &UserPatch) -> Result<Value, SyncError> {
        encode_json(patch)
    }
}

//! Mutation gateway: create, update and delete through the backend, then patch the store.
//!
//! The network call always completes first. The store is patched only with what the server
//! confirmed; on failure the error is returned and the store is left untouched.

use std::sync::Arc;

use crate::clock::Clock;
use crate::errors::SyncError;
use crate::invalidation::{InvalidationCoordinator, MutationEvent};
use crate::models::{
    Document, DocumentDraft, DocumentPatch, ForumPost, ForumPostDraft, ForumPostPatch, StudyEvent,
    StudyEventBatch, StudyEventBatchResponse, StudyEventDraft, StudyEventPatch, User, UserDraft,
    UserPatch, VideoDraft, VideoLesson, VideoPatch,
};
use crate::store::{LocalMutation, Mutable, ResourceKey, ResourceStore};

/// Path of the AI study plan batch endpoint.
const STUDY_EVENT_BATCH_PATH: &str = "/study-events/batch";

/// Write path for every resource.
pub struct MutationGateway {
    store: Arc<ResourceStore>,
    coordinator: InvalidationCoordinator,
}

impl MutationGateway {
    pub fn new(store: Arc<ResourceStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_coordinator(store, InvalidationCoordinator::new(clock))
    }

    pub fn with_coordinator(store: Arc<ResourceStore>, coordinator: InvalidationCoordinator) -> Self {
        Self { store, coordinator }
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    // ==================== GENERIC OPERATIONS ====================

    /// `POST /<resource>`; the created entity is prepended to its collection.
    pub async fn create<T: Mutable>(&self, draft: &T::Draft) -> Result<T, SyncError> {
        let body = T::draft_body(draft)?;
        let value = self
            .store
            .transport()
            .post(T::KEY.path(), body)
            .await
            .inspect_err(|e| tracing::warn!(resource = %T::KEY, "Create failed: {}", e))?;
        let entity = T::decode(value)?;

        self.store
            .apply_local_mutation(LocalMutation::Create(entity.clone()));
        tracing::info!(resource = %T::KEY, id = %entity.id(), "Created");

        let event = MutationEvent::created(T::KEY, entity.event_date());
        self.coordinator
            .after_mutations(&self.store, &[event])
            .await;
        Ok(entity)
    }

    /// `PUT /<resource>/:id`; the updated entity replaces the local copy in place.
    pub async fn update<T: Mutable>(&self, id: &str, patch: &T::Patch) -> Result<T, SyncError> {
        let body = T::patch_body(patch)?;
        let value = self
            .store
            .transport()
            .put(&T::KEY.item_path(id), body)
            .await
            .inspect_err(|e| tracing::warn!(resource = %T::KEY, id, "Update failed: {}", e))?;
        let entity = T::decode(value)?;

        self.store
            .apply_local_mutation(LocalMutation::Update(entity.clone()));
        tracing::info!(resource = %T::KEY, id, "Updated");

        let event = MutationEvent::updated(T::KEY, entity.event_date(), T::patched_fields(patch));
        self.coordinator
            .after_mutations(&self.store, &[event])
            .await;
        Ok(entity)
    }

    /// `DELETE /<resource>/:id`; the entity is removed from its collection.
    pub async fn delete<T: Mutable>(&self, id: &str) -> Result<(), SyncError> {
        // Read before deleting: the entity is gone afterwards.
        let stored_date = self.store.find::<T>(id).and_then(|e| e.event_date());

        self.store
            .transport()
            .delete(&T::KEY.item_path(id))
            .await
            .inspect_err(|e| tracing::warn!(resource = %T::KEY, id, "Delete failed: {}", e))?;

        self.store
            .apply_local_mutation(LocalMutation::<T>::Delete(id.to_string()));
        tracing::info!(resource = %T::KEY, id, "Deleted");

        let event = MutationEvent::deleted(T::KEY, stored_date);
        self.coordinator
            .after_mutations(&self.store, &[event])
            .await;
        Ok(())
    }

    // ==================== DOCUMENTS ====================

    pub async fn create_document(&self, draft: &DocumentDraft) -> Result<Document, SyncError> {
        self.create::<Document>(draft).await
    }

    pub async fn update_document(&self, id: &str, patch: &DocumentPatch) -> Result<Document, SyncError> {
        self.update::<Document>(id, patch).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), SyncError> {
        self.delete::<Document>(id).await
    }

    // ==================== VIDEOS ====================

    pub async fn create_video(&self, draft: &VideoDraft) -> Result<VideoLesson, SyncError> {
        self.create::<VideoLesson>(draft).await
    }

    /// The view-model patch is translated to the backend's snake_case fields; `patch`
    /// itself is not modified.
    pub async fn update_video(&self, id: &str, patch: &VideoPatch) -> Result<VideoLesson, SyncError> {
        self.update::<VideoLesson>(id, patch).await
    }

    pub async fn delete_video(&self, id: &str) -> Result<(), SyncError> {
        self.delete::<VideoLesson>(id).await
    }

    // ==================== FORUM ====================

    pub async fn create_forum_post(&self, draft: &ForumPostDraft) -> Result<ForumPost, SyncError> {
        self.create::<ForumPost>(draft).await
    }

    pub async fn update_forum_post(&self, id: &str, patch: &ForumPostPatch) -> Result<ForumPost, SyncError> {
        self.update::<ForumPost>(id, patch).await
    }

    pub async fn delete_forum_post(&self, id: &str) -> Result<(), SyncError> {
        self.delete::<ForumPost>(id).await
    }

    // ==================== USERS (ADMIN) ====================

    pub async fn create_user(&self, draft: &UserDraft) -> Result<User, SyncError> {
        self.create::<User>(draft).await
    }

    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, SyncError> {
        self.update::<User>(id, patch).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), SyncError> {
        self.delete::<User>(id).await
    }

    // ==================== STUDY EVENTS ====================

    pub async fn create_study_event(&self, draft: &StudyEventDraft) -> Result<StudyEvent, SyncError> {
        self.create::<StudyEvent>(draft).await
    }

    /// Create a whole AI-generated plan in one request. The created events end up at the
    /// front of the collection in the order the server returned them; the dashboard is
    /// refetched at most once.
    pub async fn create_study_events(&self, drafts: &[StudyEventDraft]) -> Result<Vec<StudyEvent>, SyncError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::to_value(StudyEventBatch { events: drafts })?;
        let value = self
            .store
            .transport()
            .post(STUDY_EVENT_BATCH_PATH, body)
            .await
            .inspect_err(|e| tracing::warn!(count = drafts.len(), "Batch create failed: {}", e))?;
        let created = serde_json::from_value::<StudyEventBatchResponse>(value)?.events;

        for event in created.iter().rev() {
            self.store
                .apply_local_mutation(LocalMutation::Create(event.clone()));
        }
        tracing::info!(count = created.len(), "Created study plan");

        let events: Vec<MutationEvent> = created
            .iter()
            .map(|event| MutationEvent::created(ResourceKey::StudyEvents, Some(event.date)))
            .collect();
        self.coordinator
            .after_mutations(&self.store, &events)
            .await;
        Ok(created)
    }

    pub async fn update_study_event(&self, id: &str, patch: &StudyEventPatch) -> Result<StudyEvent, SyncError> {
        self.update::<StudyEvent>(id, patch).await
    }

    pub async fn delete_study_event(&self, id: &str) -> Result<(), SyncError> {
        self.delete::<StudyEvent>(id).await
    }

    /// Flip the completion flag of a loaded event.
    pub async fn toggle_completion(&self, id: &str) -> Result<StudyEvent, SyncError> {
        let current = self.loaded_event(id)?;
        let patch = StudyEventPatch {
            is_completed: Some(!current.is_completed),
            ..Default::default()
        };
        self.update_study_event(id, &patch).await
    }

    /// Flip the archived flag of a loaded event.
    pub async fn toggle_archive(&self, id: &str) -> Result<StudyEvent, SyncError> {
        let current = self.loaded_event(id)?;
        let patch = StudyEventPatch {
            is_archived: Some(!current.is_archived),
            ..Default::default()
        };
        self.update_study_event(id, &patch).await
    }

    fn loaded_event(&self, id: &str) -> Result<StudyEvent, SyncError> {
        self.store
            .find::<StudyEvent>(id)
            .ok_or_else(|| SyncError::NotFound(format!("Study event {} not found", id)))
    }
}

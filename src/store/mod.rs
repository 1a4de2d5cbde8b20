//! Resource store: the single owner of every synchronized collection.
//!
//! Screens read snapshots; only `fetch`-completion and `apply_local_mutation` write. State
//! updates happen under a lock that is never held across an `.await`, so each write is
//! finished before the task yields.

mod collection;
mod filter;
mod resource;
mod state;

pub use collection::*;
pub use filter::*;
pub use resource::*;
pub use state::{Collections, ResourceStatus};

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::errors::SyncError;
use crate::models::{DashboardAggregate, ListParams, Pagination, StudyEvent};
use crate::transport::Transport;
use state::StoreState;

/// How a fetched page is merged into its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// New query: the page becomes the whole collection
    Replace,
    /// Next page: items with unseen ids are appended
    Append,
}

/// Result of a list fetch as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    pub has_more: bool,
    /// False when a newer `replace` for the same key superseded this request and its
    /// result was discarded.
    pub applied: bool,
    /// Items the server sent in this page, counted before local filtering and dedup.
    pub returned: usize,
}

impl FetchOutcome {
    fn superseded() -> Self {
        Self {
            has_more: false,
            applied: false,
            returned: 0,
        }
    }
}

/// Outcome of a dashboard refetch.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardRefresh {
    Refreshed,
    /// Transient failure; the cached aggregate was kept and no error surfaced
    KeptCached,
    Failed(SyncError),
    Superseded,
}

/// A server-confirmed change to patch into a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalMutation<T> {
    Create(T),
    Update(T),
    Delete(String),
}

/// One decoded list page.
struct Page<T> {
    items: Vec<T>,
    has_more: bool,
    returned: usize,
}

/// Client-side store for all StudyHub resources.
pub struct ResourceStore {
    transport: Arc<dyn Transport>,
    state: RwLock<StoreState>,
}

impl ResourceStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    // ==================== SNAPSHOTS ====================

    /// Snapshot of one collection.
    pub fn items<T: Resource>(&self) -> Vec<T> {
        T::collection(&self.state.read().collections).items().to_vec()
    }

    pub fn len<T: Resource>(&self) -> usize {
        T::collection(&self.state.read().collections).len()
    }

    pub fn get<T: Resource>(&self, id: &str) -> Option<T> {
        T::collection(&self.state.read().collections).get(id).cloned()
    }

    /// Any locally known copy of an entity: its collection first, then the cached dashboard.
    /// A Planner `replace` can drop dashboard-merged events from the collection while the
    /// dashboard still shows them.
    pub fn find<T: Resource>(&self, id: &str) -> Option<T> {
        let state = self.state.read();
        T::collection(&state.collections)
            .get(id)
            .cloned()
            .or_else(|| state.dashboard.as_ref().and_then(|d| T::find_in_dashboard(d, id)))
    }

    /// Snapshot of every collection at once.
    pub fn collections(&self) -> Collections {
        self.state.read().collections.clone()
    }

    pub fn dashboard(&self) -> Option<DashboardAggregate> {
        self.state.read().dashboard.clone()
    }

    pub fn status(&self, key: ResourceKey) -> ResourceStatus {
        self.state.read().status(key)
    }

    pub fn is_loading(&self, key: ResourceKey) -> bool {
        self.status(key).loading
    }

    pub fn error(&self, key: ResourceKey) -> Option<String> {
        self.status(key).error
    }

    /// Dismiss a surfaced error (retry affordance acknowledged).
    pub fn clear_error(&self, key: ResourceKey) {
        self.state.write().clear_error(key);
    }

    /// Forget everything, e.g. on sign-out.
    pub fn reset(&self) {
        self.state.write().reset();
        tracing::info!("Store reset");
    }

    // ==================== FETCHING ====================

    /// Fetch one page of `T` and merge it according to `mode`.
    ///
    /// Failures are recorded in the key's error state rather than returned. A failed
    /// `replace` leaves the collection empty; a failed `append` leaves it as it was and
    /// reports `has_more = false`.
    pub async fn fetch<T: Resource>(&self, params: &ListParams, mode: FetchMode) -> FetchOutcome {
        let key = T::KEY;
        let generation = {
            let mut state = self.state.write();
            let generation = state.begin(key, mode == FetchMode::Replace);
            if mode == FetchMode::Replace && !T::DEFER_CLEAR {
                T::collection_mut(&mut state.collections).clear();
            }
            generation
        };
        tracing::debug!(resource = %key, ?mode, generation, "Fetching page");

        let result = self.list_page::<T>(params).await;

        let mut state = self.state.write();
        if !state.is_current(key, generation) {
            tracing::debug!(resource = %key, ?mode, generation, "Discarding superseded result");
            return FetchOutcome::superseded();
        }

        match result {
            Ok(page) => {
                let items = T::retain_matching(page.items, params);
                let collection = T::collection_mut(&mut state.collections);
                match mode {
                    FetchMode::Replace => collection.replace(items),
                    FetchMode::Append => {
                        collection.append(items);
                    }
                }
                state.settle(key, None);
                FetchOutcome {
                    has_more: page.has_more,
                    applied: true,
                    returned: page.returned,
                }
            }
            Err(err) => {
                tracing::warn!(resource = %key, ?mode, "Fetch failed: {}", err);
                if mode == FetchMode::Replace {
                    T::collection_mut(&mut state.collections).clear();
                }
                state.settle(key, Some(err.message()));
                FetchOutcome {
                    has_more: false,
                    applied: true,
                    returned: 0,
                }
            }
        }
    }

    /// Request and decode one list page. A bare array body is accepted as an unpaginated list.
    /// Items that fail to decode are skipped so one bad row cannot blank the whole page.
    async fn list_page<T: Resource>(&self, params: &ListParams) -> Result<Page<T>, SyncError> {
        let key = T::KEY;
        let body = self.transport.get(key.path(), &params.to_query()).await?;

        let (raw_items, pagination) = match body {
            Value::Array(items) => (items, Pagination::default()),
            Value::Object(mut fields) => {
                let items = match fields.remove(key.list_field()) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => {
                        return Err(SyncError::Decode(format!(
                            "Expected '{}' to be an array, got {}",
                            key.list_field(),
                            other
                        )))
                    }
                };
                let pagination = match fields.remove("pagination") {
                    Some(Value::Null) | None => Pagination::default(),
                    Some(value) => serde_json::from_value(value)?,
                };
                (items, pagination)
            }
            other => {
                return Err(SyncError::Decode(format!(
                    "Unexpected {} list response: {}",
                    key, other
                )))
            }
        };

        let returned = raw_items.len();
        let items = raw_items
            .into_iter()
            .filter_map(|raw| match T::decode(raw) {
                Ok(item) => Some(item),
                Err(err) => {
                    tracing::warn!(resource = %key, "Skipping undecodable item: {}", err);
                    None
                }
            })
            .collect();

        Ok(Page {
            items,
            has_more: pagination.has_more(params.offset.unwrap_or(0), returned),
            returned,
        })
    }

    /// Fetch a single entity by id. If it is already loaded it is refreshed in place, along
    /// with any copy held by the cached dashboard; it is never inserted, since the loaded list
    /// may be filtered.
    pub async fn fetch_one<T: Resource>(&self, id: &str) -> Result<T, SyncError> {
        let value = self.transport.get(&T::KEY.item_path(id), &[]).await?;
        let entity = T::decode(value)?;
        self.apply_local_mutation(LocalMutation::Update(entity.clone()));
        Ok(entity)
    }

    /// Refetch the dashboard aggregate and fold its `todaysEvents` into the study events.
    ///
    /// A network or timeout failure while a previous aggregate is cached keeps the cache
    /// and leaves the error unset.
    pub async fn fetch_dashboard(&self) -> DashboardRefresh {
        let key = ResourceKey::Dashboard;
        let generation = self.state.write().begin(key, true);

        let result = match self.transport.get(key.path(), &[]).await {
            Ok(value) => serde_json::from_value::<DashboardAggregate>(value).map_err(SyncError::from),
            Err(err) => Err(err),
        };

        let mut state = self.state.write();
        if !state.is_current(key, generation) {
            tracing::debug!(generation, "Discarding superseded dashboard result");
            return DashboardRefresh::Superseded;
        }

        match result {
            Ok(aggregate) => {
                for event in &aggregate.todays_events {
                    state.collections.study_events.upsert(event.clone());
                }
                state.dashboard = Some(aggregate);
                state.settle(key, None);
                DashboardRefresh::Refreshed
            }
            Err(err) if err.is_transient() && state.dashboard.is_some() => {
                tracing::warn!("Dashboard refresh failed, keeping cached snapshot: {}", err);
                state.settle(key, None);
                DashboardRefresh::KeptCached
            }
            Err(err) => {
                tracing::warn!("Dashboard refresh failed: {}", err);
                state.settle(key, Some(err.message()));
                DashboardRefresh::Failed(err)
            }
        }
    }

    // ==================== LOCAL PATCHES ====================

    /// Apply a server-confirmed mutation to the local collection. No network I/O.
    ///
    /// Study event updates and deletes are mirrored into the cached dashboard so an id
    /// never has two diverging copies.
    pub fn apply_local_mutation<T: Resource>(&self, mutation: LocalMutation<T>) {
        let mut state = self.state.write();
        if let Some(dashboard) = state.dashboard.as_mut() {
            T::reconcile_dashboard(dashboard, &mutation);
        }

        let collection = T::collection_mut(&mut state.collections);
        match mutation {
            LocalMutation::Create(entity) => collection.prepend(entity),
            LocalMutation::Update(entity) => {
                let id = entity.id().to_string();
                if !collection.update(entity) {
                    tracing::debug!(resource = %T::KEY, id = %id, "Updated entity not loaded locally");
                }
            }
            LocalMutation::Delete(id) => {
                collection.remove(&id);
            }
        }
    }
}

/// Mirror a study event patch into the dashboard's copy of today's events.
pub(crate) fn reconcile_todays_events(
    dashboard: &mut DashboardAggregate,
    mutation: &LocalMutation<StudyEvent>,
) {
    match mutation {
        LocalMutation::Update(event) => {
            if let Some(slot) = dashboard.todays_events.iter_mut().find(|e| e.id == event.id) {
                *slot = event.clone();
            }
        }
        LocalMutation::Delete(id) => dashboard.todays_events.retain(|e| &e.id != id),
        LocalMutation::Create(_) => {}
    }
}

//! Pagination controller for infinite-scroll screens.
//!
//! One controller per scrolling screen. A filter change restarts the cursor with a
//! `replace` fetch; load-more triggers (button or viewport intersection) append the next
//! page at `offset = items this cursor has received from the server`. Entries merged into
//! the collection from elsewhere (dashboard events, local creates) do not shift the offset.
//! At most one append is in flight at a time.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::models::ListParams;
use crate::store::{FetchMode, FetchOutcome, Resource, ResourceStore};

/// Cursor for one query: page size, offset of the last requested page, and whether the
/// server reported more items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// What a load-more trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page was fetched and merged
    Loaded { has_more: bool },
    /// Another fetch for this collection is still pending; nothing was sent
    InFlight,
    /// The server reported no more items for the current filter; nothing was sent
    Exhausted,
    /// The filter changed while the page was loading; the page was dropped
    Superseded,
}

struct Cursor {
    params: ListParams,
    state: PaginationState,
    /// Incremented on every filter change.
    epoch: u64,
    /// Server items received for the current filter; the next page starts here.
    received: usize,
}

/// Drives paged fetches of `T` for one screen.
pub struct PaginationController<T: Resource> {
    page_size: usize,
    cursor: Mutex<Cursor>,
    loading_more: AtomicBool,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> PaginationController<T> {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            cursor: Mutex::new(Cursor {
                params: ListParams::default(),
                state: PaginationState {
                    limit: page_size,
                    offset: 0,
                    has_more: false,
                },
                epoch: 0,
                received: 0,
            }),
            loading_more: AtomicBool::new(false),
            _resource: PhantomData,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> PaginationState {
        self.cursor.lock().state
    }

    /// Filter currently driving this screen.
    pub fn params(&self) -> ListParams {
        self.cursor.lock().params.clone()
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more.load(Ordering::SeqCst)
    }

    /// Whether a load-more trigger would currently send a request.
    pub fn can_load_more(&self, store: &ResourceStore) -> bool {
        self.state().has_more && !self.is_loading_more() && !store.is_loading(T::KEY)
    }

    /// New filter (subject, grade, search or sort changed): restart from offset 0 and
    /// replace the collection.
    pub async fn apply_filter(&self, store: &ResourceStore, params: ListParams) -> FetchOutcome {
        let (request, epoch) = {
            let mut cursor = self.cursor.lock();
            cursor.epoch += 1;
            cursor.params = params;
            cursor.state = PaginationState {
                limit: self.page_size,
                offset: 0,
                has_more: false,
            };
            cursor.received = 0;
            (cursor.params.page(self.page_size, 0), cursor.epoch)
        };
        tracing::debug!(resource = %T::KEY, epoch, "Filter changed, reloading first page");

        let outcome = store.fetch::<T>(&request, FetchMode::Replace).await;

        if outcome.applied {
            let mut cursor = self.cursor.lock();
            if cursor.epoch == epoch {
                cursor.state.has_more = outcome.has_more;
                cursor.received = outcome.returned;
            }
        }
        outcome
    }

    /// Load-more trigger. Only fetches when the cursor has more items and no other fetch
    /// for the collection is pending; otherwise it is a no-op.
    pub async fn load_more(&self, store: &ResourceStore) -> LoadMore {
        if !self.state().has_more {
            return LoadMore::Exhausted;
        }
        if store.is_loading(T::KEY) || self.loading_more.swap(true, Ordering::SeqCst) {
            return LoadMore::InFlight;
        }
        let _in_flight = scopeguard::guard(&self.loading_more, |flag| {
            flag.store(false, Ordering::SeqCst)
        });

        let (request, epoch) = {
            let cursor = self.cursor.lock();
            (cursor.params.page(self.page_size, cursor.received), cursor.epoch)
        };
        tracing::debug!(resource = %T::KEY, offset = ?request.offset, "Loading next page");

        let outcome = store.fetch::<T>(&request, FetchMode::Append).await;

        let mut cursor = self.cursor.lock();
        if !outcome.applied || cursor.epoch != epoch {
            return LoadMore::Superseded;
        }
        cursor.state.offset = request.offset.unwrap_or(0);
        cursor.state.has_more = outcome.has_more;
        cursor.received = cursor.state.offset + outcome.returned;
        LoadMore::Loaded {
            has_more: outcome.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::errors::SyncError;
    use crate::models::{Document, StudyEvent};
    use crate::store::LocalMutation;
    use crate::transport::fake::FakeTransport;

    fn docs(range: std::ops::Range<u32>, subject: &str) -> Vec<Value> {
        range
            .map(|n| json!({ "id": format!("{}-{}", subject, n), "title": format!("Doc {}", n), "subject": subject }))
            .collect()
    }

    fn page(items: Vec<Value>, has_more: bool) -> Result<Value, SyncError> {
        Ok(json!({ "documents": items, "pagination": { "hasMore": has_more } }))
    }

    fn setup() -> (Arc<FakeTransport>, ResourceStore, PaginationController<Document>) {
        let fake = Arc::new(FakeTransport::new());
        let store = ResourceStore::new(fake.clone());
        (fake, store, PaginationController::new(2))
    }

    #[tokio::test]
    async fn test_filter_change_resets_offset_and_replaces() {
        let (fake, store, controller) = setup();
        fake.respond("GET", "/documents", page(docs(0..2, "physics"), true));
        fake.respond("GET", "/documents", page(docs(2..4, "physics"), true));
        fake.respond("GET", "/documents", page(docs(0..2, "maths"), false));

        controller
            .apply_filter(&store, ListParams::default().subject("Physics"))
            .await;
        controller.load_more(&store).await;
        assert_eq!(controller.state().offset, 2);

        controller
            .apply_filter(&store, ListParams::default().subject("Maths"))
            .await;

        let last = fake.calls().pop().unwrap();
        assert_eq!(last.param("offset"), Some("0"));
        assert_eq!(last.param("limit"), Some("2"));
        assert_eq!(last.param("subject"), Some("Maths"));
        assert_eq!(controller.state().offset, 0);
        assert!(!controller.state().has_more);
        assert_eq!(store.len::<Document>(), 2);
    }

    #[tokio::test]
    async fn test_load_more_offset_counts_server_items() {
        let (fake, store, controller) = setup();
        fake.respond("GET", "/documents", page(docs(0..2, "physics"), true));
        fake.respond("GET", "/documents", page(docs(2..4, "physics"), true));

        controller
            .apply_filter(&store, ListParams::default().subject("Physics"))
            .await;
        let result = controller.load_more(&store).await;

        assert_eq!(result, LoadMore::Loaded { has_more: true });
        let last = fake.calls().pop().unwrap();
        assert_eq!(last.param("offset"), Some("2"));
        assert_eq!(last.param("subject"), Some("Physics"));
        assert_eq!(store.len::<Document>(), 4);
    }

    #[tokio::test]
    async fn test_second_trigger_while_loading_is_noop() {
        let (fake, store, controller) = setup();
        fake.respond("GET", "/documents", page(docs(0..2, "physics"), true));
        controller.apply_filter(&store, ListParams::default()).await;

        let release = fake.respond_gated("GET", "/documents", page(docs(2..4, "physics"), true));

        let (first, second, _) = tokio::join!(
            controller.load_more(&store),
            controller.load_more(&store),
            async move {
                release.send(()).ok();
            }
        );

        assert_eq!(first, LoadMore::Loaded { has_more: true });
        assert_eq!(second, LoadMore::InFlight);
        assert_eq!(fake.count("GET", "/documents"), 2);
        assert!(!controller.is_loading_more());
        assert!(controller.can_load_more(&store));
    }

    #[tokio::test]
    async fn test_exhausted_cursor_stays_disabled_until_filter_change() {
        let (fake, store, controller) = setup();
        fake.respond("GET", "/documents", page(docs(0..2, "physics"), true));
        fake.respond("GET", "/documents", page(docs(2..3, "physics"), false));
        fake.respond("GET", "/documents", page(docs(0..2, "maths"), true));

        controller.apply_filter(&store, ListParams::default()).await;
        assert_eq!(
            controller.load_more(&store).await,
            LoadMore::Loaded { has_more: false }
        );
        assert_eq!(controller.load_more(&store).await, LoadMore::Exhausted);
        assert_eq!(controller.load_more(&store).await, LoadMore::Exhausted);
        assert_eq!(fake.count("GET", "/documents"), 2);

        controller
            .apply_filter(&store, ListParams::default().subject("Maths"))
            .await;
        assert!(controller.can_load_more(&store));
    }

    #[tokio::test]
    async fn test_failed_page_stops_paging() {
        let (fake, store, controller) = setup();
        fake.respond("GET", "/documents", page(docs(0..2, "physics"), true));
        fake.respond("GET", "/documents", Err(SyncError::Timeout("slow".into())));

        controller.apply_filter(&store, ListParams::default()).await;
        let result = controller.load_more(&store).await;

        assert_eq!(result, LoadMore::Loaded { has_more: false });
        assert_eq!(store.len::<Document>(), 2);
        assert_eq!(controller.load_more(&store).await, LoadMore::Exhausted);
    }

    #[tokio::test]
    async fn test_load_more_blocked_while_filter_reload_pending() {
        let (fake, store, controller) = setup();
        fake.respond("GET", "/documents", page(docs(0..2, "physics"), true));
        controller.apply_filter(&store, ListParams::default()).await;

        let release = fake.respond_gated("GET", "/documents", page(docs(0..2, "maths"), true));

        let (_, during) = tokio::join!(
            controller.apply_filter(&store, ListParams::default().subject("Maths")),
            async {
                let result = controller.load_more(&store).await;
                release.send(()).ok();
                result
            }
        );

        assert_eq!(during, LoadMore::Exhausted);
        assert_eq!(fake.count("GET", "/documents"), 2);
        assert!(controller.state().has_more);
    }

    fn event(id: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Event {}", id),
            "subject": "Physics",
            "date": "2024-05-10",
            "type": "Exam"
        })
    }

    #[tokio::test]
    async fn test_offset_ignores_entries_merged_from_elsewhere() {
        let fake = Arc::new(FakeTransport::new());
        let store = ResourceStore::new(fake.clone());
        let controller = PaginationController::<StudyEvent>::new(2);
        fake.respond(
            "GET",
            "/study-events",
            Ok(json!({ "events": [event("e1"), event("e2")], "pagination": { "hasMore": true } })),
        );
        fake.respond(
            "GET",
            "/dashboard",
            Ok(json!({
                "user": { "xp": 10, "level": 1, "streak": 0, "isPremium": false, "bookmarks": [] },
                "todaysEvents": [event("e7")],
                "progress": {
                    "todayCompleted": 0,
                    "todayTotal": 1,
                    "todayPercentage": 0.0,
                    "levelProgress": 0.1,
                    "xpToNextLevel": 90
                }
            })),
        );
        fake.respond(
            "GET",
            "/study-events",
            Ok(json!({ "events": [event("e3"), event("e4")], "pagination": { "hasMore": false } })),
        );

        controller.apply_filter(&store, ListParams::default()).await;
        store.fetch_dashboard().await;
        let created: StudyEvent = serde_json::from_value(event("e9")).unwrap();
        store.apply_local_mutation(LocalMutation::Create(created));
        assert_eq!(store.len::<StudyEvent>(), 4);

        let result = controller.load_more(&store).await;

        assert_eq!(result, LoadMore::Loaded { has_more: false });
        let last = fake.calls().pop().unwrap();
        assert_eq!(last.path, "/study-events");
        assert_eq!(last.param("offset"), Some("2"));
        assert_eq!(store.len::<StudyEvent>(), 6);
    }
}

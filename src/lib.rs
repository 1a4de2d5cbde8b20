//! StudyHub Sync
//!
//! Client-side synchronization layer for the StudyHub REST backend: a resource store with
//! sequence-guarded fetches, infinite-scroll pagination, a mutation gateway, and rule-driven
//! dashboard invalidation.

pub mod clock;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod invalidation;
pub mod models;
pub mod pagination;
pub mod store;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, LogFormat};
pub use errors::SyncError;
pub use gateway::MutationGateway;
pub use invalidation::{Aggregate, InvalidationCoordinator, MutationEvent, MutationKind};
pub use pagination::{LoadMore, PaginationController, PaginationState};
pub use store::{
    DashboardRefresh, FetchMode, FetchOutcome, LocalMutation, ResourceKey, ResourceStore,
};
pub use transport::{HttpTransport, Transport};

//! Transport module: the seam between the store and the REST backend.
//!
//! The store only speaks JSON values through [`Transport`]; typed decoding happens above it.

mod http;

#[cfg(test)]
pub mod fake;

pub use http::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SyncError;

/// JSON request/response transport for the backend's REST surface.
///
/// Paths are relative to the API base (`/documents`, `/documents/{id}`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET path?query`
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, SyncError>;

    /// `POST path` with a JSON body, returning the created entity.
    async fn post(&self, path: &str, body: Value) -> Result<Value, SyncError>;

    /// `PUT path` with a partial JSON body, returning the updated entity.
    async fn put(&self, path: &str, body: Value) -> Result<Value, SyncError>;

    /// `DELETE path`; the backend answers with no content.
    async fn delete(&self, path: &str) -> Result<(), SyncError>;
}

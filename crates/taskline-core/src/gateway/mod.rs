//! Persistence gateway
//!
//! The store never talks to the backend directly; it goes through an
//! [`EntryGateway`]. Two implementations ship with the crate:
//!
//! - [`HttpGateway`]: the REST backend
//! - [`MemoryGateway`]: an in-process backend for tests and local wiring
//!
//! ## Endpoints
//!
//! ```text
//! GET    /entries        -> [Entry]
//! GET    /entries/{id}   -> Entry
//! POST   /entries        { description }          -> Entry
//! PUT    /entries/{id}   { description, status }  -> Entry
//! DELETE /entries/{id}   -> Entry | empty
//! ```

mod http;
mod memory;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::models::{Entry, EntryChanges, EntryId, NewEntry};

pub use http::HttpGateway;
pub use memory::MemoryGateway;

/// Remote persistence for entries
#[async_trait]
pub trait EntryGateway: Send + Sync {
    /// Fetch every entry the backend has
    async fn list(&self) -> GatewayResult<Vec<Entry>>;

    /// Fetch a single entry
    async fn get(&self, id: &EntryId) -> GatewayResult<Entry>;

    /// Create an entry; the backend assigns id, status and creation time
    async fn create(&self, entry: &NewEntry) -> GatewayResult<Entry>;

    /// Replace description and status of an existing entry
    async fn update(&self, id: &EntryId, changes: &EntryChanges) -> GatewayResult<Entry>;

    /// Delete an entry, returning it if the backend echoes it back
    async fn delete(&self, id: &EntryId) -> GatewayResult<Option<Entry>>;
}

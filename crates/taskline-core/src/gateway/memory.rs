//! In-process gateway
//!
//! Behaves like the REST backend (assigns ids, defaults status to pending,
//! stamps creation time) but keeps everything in memory. Failures and
//! response delays can be queued to exercise error paths and out-of-order
//! completion.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::EntryGateway;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Entry, EntryChanges, EntryId, EntryStatus, NewEntry};

#[derive(Debug, Default)]
struct Backend {
    entries: Vec<Entry>,
    /// Errors returned by the next calls, in order
    failures: VecDeque<GatewayError>,
    /// Response delays for the next calls, in order
    delays: VecDeque<Duration>,
    list_calls: usize,
}

impl Backend {
    /// Take the queued failure or delay for the call being made
    fn next_outcome(&mut self) -> (Option<GatewayError>, Option<Duration>) {
        (self.failures.pop_front(), self.delays.pop_front())
    }
}

/// In-memory [`EntryGateway`]
///
/// Cloning shares the same backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    backend: Arc<Mutex<Backend>>,
}

impl MemoryGateway {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds these entries
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Backend {
                entries,
                ..Backend::default()
            })),
        }
    }

    /// Current backend contents
    pub async fn entries(&self) -> Vec<Entry> {
        self.backend.lock().await.entries.clone()
    }

    /// Insert or replace an entry behind the store's back
    pub async fn put(&self, entry: Entry) {
        let mut backend = self.backend.lock().await;
        match backend.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => backend.entries.push(entry),
        }
    }

    /// Make the next call fail with this error
    ///
    /// Queued failures are consumed one per call, in order.
    pub async fn fail_next(&self, error: GatewayError) {
        self.backend.lock().await.failures.push_back(error);
    }

    /// Delay the response of the next call
    ///
    /// The change is applied to the backend immediately; only the answer
    /// is held back, the way a slow network would.
    pub async fn delay_next(&self, delay: Duration) {
        self.backend.lock().await.delays.push_back(delay);
    }

    /// Number of `list` calls served so far
    pub async fn list_calls(&self) -> usize {
        self.backend.lock().await.list_calls
    }

    async fn respond<T>(delay: Option<Duration>, result: GatewayResult<T>) -> GatewayResult<T> {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[async_trait]
impl EntryGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Entry>> {
        let (result, delay) = {
            let mut backend = self.backend.lock().await;
            backend.list_calls += 1;
            match backend.next_outcome() {
                (Some(err), delay) => (Err(err), delay),
                (None, delay) => (Ok(backend.entries.clone()), delay),
            }
        };
        Self::respond(delay, result).await
    }

    async fn get(&self, id: &EntryId) -> GatewayResult<Entry> {
        let (result, delay) = {
            let mut backend = self.backend.lock().await;
            match backend.next_outcome() {
                (Some(err), delay) => (Err(err), delay),
                (None, delay) => {
                    let found = backend
                        .entries
                        .iter()
                        .find(|e| &e.id == id)
                        .cloned()
                        .ok_or_else(|| GatewayError::NotFound { id: id.clone() });
                    (found, delay)
                }
            }
        };
        Self::respond(delay, result).await
    }

    async fn create(&self, entry: &NewEntry) -> GatewayResult<Entry> {
        let (result, delay) = {
            let mut backend = self.backend.lock().await;
            match backend.next_outcome() {
                (Some(err), delay) => (Err(err), delay),
                (None, delay) => {
                    let created = Entry::new(
                        Uuid::new_v4().simple().to_string(),
                        entry.description.clone(),
                        EntryStatus::Pending,
                        Utc::now().timestamp_millis(),
                    );
                    backend.entries.push(created.clone());
                    (Ok(created), delay)
                }
            }
        };
        Self::respond(delay, result).await
    }

    async fn update(&self, id: &EntryId, changes: &EntryChanges) -> GatewayResult<Entry> {
        let (result, delay) = {
            let mut backend = self.backend.lock().await;
            match backend.next_outcome() {
                (Some(err), delay) => (Err(err), delay),
                (None, delay) => {
                    let updated = match backend.entries.iter_mut().find(|e| &e.id == id) {
                        Some(existing) => {
                            existing.description = changes.description.clone();
                            existing.status = changes.status;
                            Ok(existing.clone())
                        }
                        None => Err(GatewayError::NotFound { id: id.clone() }),
                    };
                    (updated, delay)
                }
            }
        };
        Self::respond(delay, result).await
    }

    async fn delete(&self, id: &EntryId) -> GatewayResult<Option<Entry>> {
        let (result, delay) = {
            let mut backend = self.backend.lock().await;
            match backend.next_outcome() {
                (Some(err), delay) => (Err(err), delay),
                (None, delay) => {
                    let removed = match backend.entries.iter().position(|e| &e.id == id) {
                        Some(pos) => Ok(Some(backend.entries.remove(pos))),
                        None => Err(GatewayError::NotFound { id: id.clone() }),
                    };
                    (removed, delay)
                }
            }
        };
        Self::respond(delay, result).await
    }
}

//! Entry store
//!
//! The `EntryStore` is the single source of truth for the entry list. Every
//! mutation goes to the backend first; only a confirmed result is applied
//! locally.
//!
//! ## Ordering
//!
//! Gateway calls run on the caller's task and may overlap. Their results are
//! applied by one store task, one at a time. When two `update`/`delete`
//! calls on the same entry complete out of order, the one issued last wins:
//! the older result is discarded as stale. A confirmed delete is the
//! exception; it always removes the entry.
//!
//! ## Usage
//!
//! ```ignore
//! let store = EntryStore::open(&config).await?;  // hydrates from the backend
//!
//! let entry = store.add("buy milk").await?;
//! store.update(&entry.with_status(EntryStatus::Finished), true).await?;
//!
//! for entry in store.entries() {
//!     println!("{} {}", entry.status, entry.description);
//! }
//! ```

mod task;
mod transition;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::gateway::{EntryGateway, HttpGateway};
use crate::models::{Entry, EntryId, EntryStatus, NewEntry};
use crate::notify::{Notification, NotificationSink, TracingSink, DEFAULT_NOTIFY_DURATION};

use task::{spawn_store_task, Sequencer, SnapshotReceiver, StoreCommand};

pub use task::Applied;
pub use transition::Transition;

/// Tunables for an [`EntryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Display time of success notifications
    pub notify_duration: Duration,
    /// Message shown after a notified update
    pub updated_message: String,
    /// Message shown after a notified delete
    pub deleted_message: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            notify_duration: DEFAULT_NOTIFY_DURATION,
            updated_message: "Entry updated".to_string(),
            deleted_message: "Entry deleted".to_string(),
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            notify_duration: config.notify_duration(),
            ..Self::default()
        }
    }
}

/// Handle to the entry store
///
/// Cheap to clone; all clones share the same list.
#[derive(Clone)]
pub struct EntryStore {
    gateway: Arc<dyn EntryGateway>,
    sink: Arc<dyn NotificationSink>,
    options: Arc<StoreOptions>,
    command_tx: mpsc::Sender<StoreCommand>,
    snapshot_rx: SnapshotReceiver,
    sequencer: Arc<Sequencer>,
}

impl EntryStore {
    /// Open a store against the configured REST backend
    ///
    /// Notifications go to the log.
    pub async fn open(config: &Config) -> StoreResult<Self> {
        let gateway = HttpGateway::from_config(config)?;
        Self::open_with(gateway, TracingSink, StoreOptions::from_config(config)).await
    }

    /// Open a store with a specific gateway and notification sink
    ///
    /// Spawns the store task and hydrates it with one `refresh`. If that
    /// fails the task is stopped and the error returned.
    pub async fn open_with<G, S>(gateway: G, sink: S, options: StoreOptions) -> StoreResult<Self>
    where
        G: EntryGateway + 'static,
        S: NotificationSink + 'static,
    {
        let sequencer = Arc::new(Sequencer::default());
        let (command_tx, snapshot_rx) = spawn_store_task(Arc::clone(&sequencer));
        let store = Self {
            gateway: Arc::new(gateway),
            sink: Arc::new(sink),
            options: Arc::new(options),
            command_tx,
            snapshot_rx,
            sequencer,
        };

        if let Err(e) = store.refresh().await {
            warn!("Failed to load entries: {}", e);
            store.shutdown().await;
            return Err(e);
        }

        info!("Entry store ready with {} entries", store.len());
        Ok(store)
    }

    // ==================== Operations ====================

    /// Replace the list with the backend's current contents
    ///
    /// On failure the previous list is kept.
    pub async fn refresh(&self) -> StoreResult<()> {
        self.ensure_open()?;
        let entries = self.gateway.list().await?;
        debug!("Fetched {} entries", entries.len());
        self.apply(Transition::Refreshed(entries), None).await?;
        Ok(())
    }

    /// Create an entry and append the backend's version of it
    ///
    /// The description is sent as given; callers validate it.
    pub async fn add(&self, description: impl Into<String>) -> StoreResult<Entry> {
        self.ensure_open()?;
        let created = self.gateway.create(&NewEntry::new(description)).await?;
        debug!("Created entry {}", created.id);
        self.apply(Transition::Added(created.clone()), None).await?;
        Ok(created)
    }

    /// Send an entry's description and status to the backend
    ///
    /// On success the entry with the same id is replaced in place by the
    /// backend's version and, if `notify` is set, a success notification is
    /// sent. A result overtaken by a later-issued update or delete of the
    /// same entry is not applied and not notified. On failure the list is
    /// unchanged and nothing is notified.
    pub async fn update(&self, entry: &Entry, notify: bool) -> StoreResult<Entry> {
        self.ensure_open()?;
        let ticket = self.sequencer.issue();

        let updated = match self.gateway.update(&entry.id, &entry.changes()).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Failed to update entry {}: {}", entry.id, e);
                return Err(e.into());
            }
        };

        let applied = self
            .apply(Transition::Updated(updated.clone()), Some(ticket.seq()))
            .await?;
        if notify && applied != Applied::Stale {
            self.notify(&self.options.updated_message);
        }
        Ok(updated)
    }

    /// Delete an entry on the backend, then drop it from the list
    ///
    /// Only the id is sent. A confirmed delete is always applied, even when
    /// a later-issued update finished first. Failure handling matches
    /// [`EntryStore::update`].
    pub async fn delete(&self, entry: &Entry, notify: bool) -> StoreResult<()> {
        self.ensure_open()?;
        let ticket = self.sequencer.issue();

        if let Err(e) = self.gateway.delete(&entry.id).await {
            warn!("Failed to delete entry {}: {}", entry.id, e);
            return Err(e.into());
        }

        self.apply(Transition::Deleted(entry.id.clone()), Some(ticket.seq()))
            .await?;
        if notify {
            self.notify(&self.options.deleted_message);
        }
        Ok(())
    }

    /// Fetch one entry straight from the backend
    ///
    /// Does not touch the list.
    pub async fn fetch(&self, id: &EntryId) -> StoreResult<Entry> {
        Ok(self.gateway.get(id).await?)
    }

    /// Stop the store task
    ///
    /// Later operations fail with [`StoreError::Closed`]; reads keep
    /// returning the last snapshot.
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self
            .command_tx
            .send(StoreCommand::Shutdown { done: done_tx })
            .await
            .is_ok()
        {
            let _ = done_rx.await;
        }
    }

    // ==================== Reads ====================

    /// Current entries, in list order
    pub fn entries(&self) -> Vec<Entry> {
        self.snapshot_rx.borrow().to_vec()
    }

    /// Current snapshot without copying the entries
    pub fn snapshot(&self) -> Arc<[Entry]> {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch the list; a new snapshot is published after every change
    pub fn subscribe(&self) -> watch::Receiver<Arc<[Entry]>> {
        self.snapshot_rx.clone()
    }

    /// Get an entry by id
    pub fn get(&self, id: &EntryId) -> Option<Entry> {
        self.snapshot_rx.borrow().iter().find(|e| &e.id == id).cloned()
    }

    /// Entries with the given status, in list order
    pub fn by_status(&self, status: EntryStatus) -> Vec<Entry> {
        self.snapshot_rx
            .borrow()
            .iter()
            .filter(|e| e.status == status)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot_rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot_rx.borrow().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    // ==================== Internals ====================

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    async fn apply(&self, transition: Transition, seq: Option<u64>) -> StoreResult<Applied> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.command_tx
            .send(StoreCommand::Apply {
                transition,
                seq,
                ack: ack_tx,
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        ack_rx.await.map_err(|_| StoreError::Closed)
    }

    fn notify(&self, message: &str) {
        self.sink
            .notify(Notification::success(message).with_duration(self.options.notify_duration));
    }
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("entries", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

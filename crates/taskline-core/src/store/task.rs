//! Store task
//!
//! A single tokio task owns the entry list. Handles send it confirmed
//! transitions over an mpsc channel; it applies them one at a time, in
//! arrival order, and publishes each new snapshot on a watch channel.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use super::transition::Transition;
use crate::models::{Entry, EntryId};

/// Commands sent to the store task
#[derive(Debug)]
pub(crate) enum StoreCommand {
    /// Apply a confirmed transition
    Apply {
        transition: Transition,
        /// Issue order of the operation, for per-entry ordering
        seq: Option<u64>,
        ack: oneshot::Sender<Applied>,
    },
    /// Stop the task
    Shutdown { done: oneshot::Sender<()> },
}

/// What happened to a transition sent to the store task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The list changed and a new snapshot was published
    Changed,
    /// The transition matched the current state; nothing to publish
    Unchanged,
    /// A later-issued operation on the same entry was already applied
    Stale,
}

/// Read side of the store task
pub(crate) type SnapshotReceiver = watch::Receiver<Arc<[Entry]>>;

/// Issues operation sequence numbers and tracks the ones still in flight
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    inner: Mutex<SequencerState>,
}

#[derive(Debug, Default)]
struct SequencerState {
    last_issued: u64,
    in_flight: BTreeSet<u64>,
}

impl Sequencer {
    /// Take the next sequence number; it stays in flight until the ticket drops
    pub(crate) fn issue(self: &Arc<Self>) -> SeqTicket {
        let mut state = self.lock();
        state.last_issued += 1;
        let seq = state.last_issued;
        state.in_flight.insert(seq);

        SeqTicket {
            seq,
            sequencer: Arc::clone(self),
        }
    }

    /// Lowest sequence an unfinished or future operation can carry
    fn floor(&self) -> u64 {
        let state = self.lock();
        state
            .in_flight
            .first()
            .copied()
            .unwrap_or(state.last_issued + 1)
    }

    fn lock(&self) -> MutexGuard<'_, SequencerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// An issued sequence number, released when dropped
#[derive(Debug)]
pub(crate) struct SeqTicket {
    seq: u64,
    sequencer: Arc<Sequencer>,
}

impl SeqTicket {
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for SeqTicket {
    fn drop(&mut self) {
        self.sequencer.lock().in_flight.remove(&self.seq);
    }
}

/// Spawn the store task with an empty list
pub(crate) fn spawn_store_task(
    sequencer: Arc<Sequencer>,
) -> (mpsc::Sender<StoreCommand>, SnapshotReceiver) {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::<[Entry]>::from(Vec::new()));

    let state = StoreState {
        entries: Vec::new(),
        last_seq: HashMap::new(),
        sequencer,
        snapshot_tx,
    };
    tokio::spawn(store_task_loop(state, command_rx));

    (command_tx, snapshot_rx)
}

struct StoreState {
    entries: Vec<Entry>,
    /// Highest applied sequence per entry; kept after deletes as a tombstone
    /// until no operation that could be older is still in flight
    last_seq: HashMap<EntryId, u64>,
    sequencer: Arc<Sequencer>,
    snapshot_tx: watch::Sender<Arc<[Entry]>>,
}

impl StoreState {
    fn apply(&mut self, transition: Transition, seq: Option<u64>) -> Applied {
        if let (Some(seq), Some(id)) = (seq, transition.entry_id()) {
            let last = self.last_seq.get(id).copied().unwrap_or(0);

            // A confirmed delete always lands: the backend no longer has the entry
            let is_delete = matches!(transition, Transition::Deleted(_));
            if last > seq && !is_delete {
                debug!("Discarding stale change to {} (seq {} < {})", id, seq, last);
                return Applied::Stale;
            }
            self.last_seq.insert(id.clone(), last.max(seq));
        }

        let applied = if transition.apply(&mut self.entries) {
            self.snapshot_tx
                .send_replace(Arc::<[Entry]>::from(self.entries.clone()));
            Applied::Changed
        } else {
            Applied::Unchanged
        };

        self.prune();
        applied
    }

    /// Forget sequences no in-flight operation can be older than
    fn prune(&mut self) {
        let floor = self.sequencer.floor();
        self.last_seq.retain(|_, last| *last >= floor);
    }
}

/// Main store task loop
async fn store_task_loop(mut state: StoreState, mut command_rx: mpsc::Receiver<StoreCommand>) {
    while let Some(command) = command_rx.recv().await {
        match command {
            StoreCommand::Apply {
                transition,
                seq,
                ack,
            } => {
                let applied = state.apply(transition, seq);
                // The caller may have given up waiting; the change stands
                let _ = ack.send(applied);
            }
            StoreCommand::Shutdown { done } => {
                command_rx.close();
                let _ = done.send(());
                break;
            }
        }
    }

    debug!("Entry store task stopped");
}

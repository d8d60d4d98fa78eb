//! taskline core library
//!
//! This crate keeps a client-side list of entries in step with a REST
//! backend. Each entry has a description and a workflow status (`pending`,
//! `in-progress`, `finished`).
//!
//! # Architecture
//!
//! - **Backend**: source of truth, reached through an [`EntryGateway`]
//! - **EntryStore**: in-memory mirror, changed only by backend-confirmed
//!   results
//!
//! # Quick Start
//!
//! ```text
//! let store = EntryStore::open(&Config::load()?).await?;
//!
//! let entry = store.add("call dentist").await?;
//! store.update(&entry.with_status(EntryStatus::InProgress), true).await?;
//!
//! let pending = store.by_status(EntryStatus::Pending);
//! ```
//!
//! # Modules
//!
//! - `store`: the entry store (main entry point)
//! - `models`: entry, status and request bodies
//! - `gateway`: REST and in-memory persistence
//! - `notify`: user notification sink
//! - `error`: gateway and store errors
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod store;

pub use config::Config;
pub use error::{ErrorKind, GatewayError, StoreError, StoreResult};
pub use gateway::{EntryGateway, HttpGateway, MemoryGateway};
pub use models::{Entry, EntryChanges, EntryId, EntryStatus, NewEntry};
pub use notify::{Notification, NotificationKind, NotificationSink, TracingSink};
pub use store::{EntryStore, StoreOptions};

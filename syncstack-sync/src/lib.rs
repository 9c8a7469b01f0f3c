//! Remote synchronization for syncstack records and record sets.
//!
//! This crate provides:
//! - The [`Transport`] abstraction, a scripted [`mock::MockTransport`] and a
//!   reqwest-backed [`HttpTransport`]
//! - [`SyncClient`], which runs the validate → request → merge → persist →
//!   notify lifecycle for save, fetch and destroy
//! - Collection fetch with reconciliation by server identity
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use syncstack_model::{DefaultCollection, RecordSchema, RecordSet, Services};
//! use syncstack_sync::{HttpTransport, SyncClient, SyncConfig, SyncOptions};
//!
//! # async fn run() -> syncstack_sync::SyncResult<()> {
//! let config = SyncConfig::default();
//! let client = SyncClient::new(Arc::new(HttpTransport::new(&config)?), config);
//! let services = Services::in_memory();
//! let notes = RecordSet::new(
//!     Arc::new(RecordSchema::new("Note", "https://api.example.com", "notes")),
//!     Arc::new(DefaultCollection),
//!     &services,
//! );
//! client.fetch_set(&notes, SyncOptions::new()).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod collection;
pub mod config;
pub mod error;
mod http;
pub mod lifecycle;
mod options;
mod outcome;
pub mod transport;
mod url;

pub use client::SyncClient;
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use http::HttpTransport;
pub use lifecycle::{Lifecycle, SyncPhase};
pub use options::{Completion, SyncOptions};
pub use outcome::{SyncOutcome, SyncReport};
pub use transport::{mock, Transport};
pub use url::compose_url;

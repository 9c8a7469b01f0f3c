//! Record model for syncstack.
//!
//! Defines the in-memory working copy that the sync layer keeps consistent
//! with the local store and the remote endpoint:
//! - [`EventBus`]: subscribe/unsubscribe/publish by notification kind and
//!   optional source filter
//! - [`diff`]: the source-relative property comparison behind dirty
//!   tracking and change gating
//! - [`Record`]: one addressable entity with dynamically typed properties
//! - [`RecordSet`]: an ordered, identity-unique collection of records
//! - [`RecordHooks`] / [`CollectionHooks`]: the per-type capability
//!   interfaces (defaults, field mapping, parse, validate, authenticate)
//!
//! The network lifecycle (save/fetch/destroy and collection reconciliation)
//! lives in `syncstack-sync` and drives these types through their public API.

mod diff;
pub mod events;
mod hooks;
mod options;
pub mod record;
pub mod record_set;
mod schema;
mod services;

pub use diff::diff;
pub use events::{Callback, EventBus, Notification, NotificationKind, Payload};
pub use hooks::{CollectionHooks, DefaultCollection, RecordHooks};
pub use options::SetOptions;
pub use record::{Record, CLIENT_ID, ID, NAME, PRESERVED_KEYS, URL};
pub use record_set::{Comparator, RecordSet};
pub use schema::{FieldMap, RecordSchema};
pub use services::Services;

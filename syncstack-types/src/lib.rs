//! Core type definitions for syncstack.
//!
//! This crate defines the plugin-agnostic types shared by every layer of the
//! synchronization stack:
//! - The dynamically typed property value (`Value`) and property map
//! - Source, listener and client identifiers (UUID v7)
//! - Exchange data describing one request/response round trip with a remote
//!   CRUD endpoint
//!
//! Records, record sets and the event bus live in `syncstack-model`; the
//! network orchestration lives in `syncstack-sync`.

mod exchange;
mod ids;
mod value;

pub use exchange::{Encoding, Exchange, ExchangeError, Method, Request, Response};
pub use ids::{ClientId, ListenerId, SourceId};
pub use value::{is_blank, value_to_string, PropertyMap, Value};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

//! Core domain types shared by the registry tag index crates.
//!
//! This crate defines:
//! - Configuration for the server, storage root, and index database
//! - The registry notification event model consumed by the index sink
//! - Tag name derivation from manifest URLs

pub mod config;
pub mod error;
pub mod event;

pub use error::{Error, Result};
pub use event::{Envelope, Event, EventAction, Target, tag_from_url};

/// Status assigned to every freshly pushed tag.
pub const STATUS_UNSET: &str = "unset";

/// Page size used when a query does not ask for a positive limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// File name of the index database inside the storage root directory.
pub const DEFAULT_DATABASE_FILE: &str = "registry.sqlite3";

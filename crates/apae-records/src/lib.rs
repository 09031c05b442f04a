//! `apae-records` - REST records backed by JSON array files
//!
//! This library provides the file-backed collection store, the per-resource
//! schemas and the HTTP surface serving users, professionals, teachers,
//! students, appointments and events.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod schema;
pub mod server;
pub mod store;

pub use catalog::{Catalog, Resource};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Fields, Record};
pub use schema::{Schema, UpdateMode};
pub use store::{CollectionStore, ConcurrencyPolicy, IdPolicy, RecordCollection};

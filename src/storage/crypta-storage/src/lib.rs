//! # Crypta Storage
//!
//! Record store abstraction for Crypta backends.
//!
//! Provides the [`RecordStore`] trait, the [`Record`] type it persists, and
//! an in-memory implementation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::{Record, RecordId, RecordStore};
pub use error::StorageError;
pub use memory::MemoryStore;

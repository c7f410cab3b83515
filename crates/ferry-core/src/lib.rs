//! Ferry core - schema classification, identifier mapping, and staging.
//!
//! This crate provides the synchronous heart of the migration engine: the
//! field/relationship classifier that turns remote describe metadata into a
//! migration-ready partition, the sled-backed store that persists
//! source-to-destination identifier translations per migration job, and the
//! flat-file staging layer with the fixed `data/` directory conventions.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod classify;
pub mod error;
pub mod staging;
pub mod store;

pub use classify::{classify, migration_order, FieldKind, ObjectClassification};
pub use error::Error;
pub use staging::{DataLayout, StagingError};
pub use store::{IdMapping, JobDetail, MappingKey, MappingStore};

//! Record migration engine for remote object stores.
//!
//! This crate executes the bulk operations of a migration job against an
//! [`ObjectApi`](ferry_api::ObjectApi) implementation: per-record insert
//! with reference remapping, bulk update and delete with per-row statuses,
//! and export to the staging layer. Operations run strictly sequentially so
//! bulk responses line up positionally with their inputs, and a
//! malformed-request rejection mid-insert hands back the accumulated
//! partial state instead of discarding it.
//!
//! # Modules
//!
//! - [`migrator`] - The [`Migrator`] and its bulk operations
//! - [`report`] - Operation reports and the partial-failure snapshot
//! - [`error`] - Migration error types

pub mod error;
pub mod migrator;
pub mod report;

pub use error::MigrateError;
pub use migrator::Migrator;
pub use report::{
    DeleteReport, IdMap, InsertAborted, InsertOutcome, InsertReport, UpdateReport,
};

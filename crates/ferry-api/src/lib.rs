//! Remote object-store API surface for ferry.
//!
//! This crate defines the types exchanged with a remote object store and the
//! [`ObjectApi`] trait that abstracts its bulk-capable CRUD protocol. The wire
//! protocol itself (transport, framing, authentication) is not part of this
//! crate; an implementation receives whatever session handle it needs at
//! construction time and exposes only the five operations the migration
//! engine consumes.
//!
//! # Modules
//!
//! - [`api`] - The `ObjectApi` trait
//! - [`describe`] - Field metadata descriptors returned by the describe call
//! - [`record`] - Record field-map representation and helpers
//! - [`result`] - Save/query result types for bulk operations
//! - [`error`] - API error types

pub mod api;
pub mod describe;
pub mod error;
pub mod record;
pub mod result;

pub use api::ObjectApi;
pub use describe::{FieldDescribe, ObjectDescribe};
pub use error::ApiError;
pub use record::{is_blank, FieldMap, ID_FIELD};
pub use result::{QueryResult, SaveError, SaveResult, ATTRIBUTES_FIELD};

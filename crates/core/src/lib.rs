//! `grocerdesk-core`: shared building blocks for the back-office client.
//!
//! This crate carries no IO: record identifiers, the client error taxonomy and
//! field-level validation messages.

pub mod error;
pub mod id;

pub use error::{ClientError, ClientResult, FieldErrors, GENERIC_FAILURE_MESSAGE};
pub use id::{InvalidRecordId, RecordId};

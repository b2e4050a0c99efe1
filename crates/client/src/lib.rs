//! `grocerdesk-client`
//!
//! **Responsibility:** talk to the back-office REST API.
//!
//! This crate provides:
//! - a `Transport` seam with an HTTP implementation (`reqwest`) and an
//!   in-memory backend for tests and demos
//! - request payloads (JSON, or multipart when files are attached)
//! - one explicit response envelope per collection
//! - `CollectionResource<T>`: list / get / create / update / delete for any
//!   type implementing `Collection`

pub mod api;
pub mod collection;
pub mod envelope;
pub mod http;
pub mod in_memory;
pub mod payload;
pub mod resource;
pub mod transport;
pub mod upload;

pub use api::ApiClient;
pub use collection::{AuthPolicy, Collection};
pub use envelope::Envelope;
pub use http::{HttpConfig, HttpTransport};
pub use in_memory::InMemoryTransport;
pub use payload::{Attachment, MultipartForm, Part, PartValue, Payload};
pub use resource::CollectionResource;
pub use transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
pub use upload::{UploadPolicy, UploadRejected};

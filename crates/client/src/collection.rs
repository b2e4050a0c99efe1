//! Per-domain description of a remote collection.

use core::fmt::Debug;

use grocerdesk_core::RecordId;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::envelope::Envelope;

/// Whether calls to a collection carry the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    Public,
    Bearer,
}

/// A record type exchanged with one REST collection.
///
/// Implementing this is all a domain needs to get list/get/create/update/
/// delete through `CollectionResource`.
pub trait Collection: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Route prefix, e.g. `/categories`.
    const BASE_PATH: &'static str;

    /// Singular human label, used in logs and notices ("category").
    const LABEL: &'static str;

    const AUTH: AuthPolicy;

    /// Wrapper around the array returned by `GET {base}/get`.
    const LIST_ENVELOPE: Envelope;

    /// Wrapper around the record returned by get/create/update.
    const RECORD_ENVELOPE: Envelope;

    fn id(&self) -> &RecordId;

    /// Name shown in tables and in the delete confirmation.
    fn display_name(&self) -> &str;

    /// Text the list search matches against.
    fn search_fields(&self) -> Vec<&str> {
        vec![self.display_name()]
    }
}

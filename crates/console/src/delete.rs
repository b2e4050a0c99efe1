//! Two-step delete guard.

use grocerdesk_client::Collection;
use grocerdesk_core::{ClientError, ClientResult, RecordId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("no deletion is pending")]
    NothingPending,

    #[error("a deletion is already in flight")]
    InFlight,

    #[error(transparent)]
    Rejected(#[from] ClientError),
}

/// Which record the user asked to delete, and whether the request is out.
#[derive(Debug, Clone)]
pub struct DeleteConfirmation<T> {
    target: Option<T>,
    in_flight: bool,
    error: Option<String>,
}

impl<T> Default for DeleteConfirmation<T> {
    fn default() -> Self {
        Self {
            target: None,
            in_flight: false,
            error: None,
        }
    }
}

impl<T: Collection> DeleteConfirmation<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for confirmation. Ignored while a deletion is in flight.
    pub fn open(&mut self, record: T) -> bool {
        if self.in_flight {
            return false;
        }
        self.target = Some(record);
        self.error = None;
        true
    }

    /// Close without deleting. Ignored while a deletion is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.target = None;
        self.error = None;
        true
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn can_confirm(&self) -> bool {
        self.is_open() && !self.in_flight
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.target.as_ref().map(Collection::display_name)
    }

    /// Error from the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Lock the dialog and return the id to delete.
    pub fn begin_confirm(&mut self) -> Result<RecordId, ConfirmError> {
        if self.in_flight {
            return Err(ConfirmError::InFlight);
        }
        let id = self
            .target
            .as_ref()
            .map(|record| record.id().clone())
            .ok_or(ConfirmError::NothingPending)?;
        self.in_flight = true;
        self.error = None;
        Ok(id)
    }

    /// Close and hand back the deleted record, or stay open with the error.
    pub fn finish(&mut self, result: ClientResult<()>) -> ClientResult<T> {
        self.in_flight = false;
        match result {
            Ok(()) => self
                .target
                .take()
                .ok_or_else(|| ClientError::not_found("nothing to delete")),
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }
}

//! Page-level list state and the controller that drives it.

use std::sync::Arc;

use grocerdesk_client::{Collection, CollectionResource};
use grocerdesk_core::{ClientResult, RecordId};

use crate::delete::{ConfirmError, DeleteConfirmation};
use crate::form::Form;
use crate::modal::{MutationModal, SubmitError};
use crate::notice::{Notice, Notifier};
use crate::search::SearchFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Records as last acknowledged by the server, in server order.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
    status: ListStatus,
    error_message: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: ListStatus::Idle,
            error_message: None,
        }
    }
}

impl<T: Collection> ListState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn find(&self, id: &RecordId) -> Option<&T> {
        self.items.iter().find(|record| record.id() == id)
    }

    pub fn begin_load(&mut self) {
        self.status = ListStatus::Loading;
    }

    /// Apply a list result. A failure keeps the previous items.
    pub fn resolve(&mut self, result: ClientResult<Vec<T>>) -> ClientResult<()> {
        match result {
            Ok(items) => {
                self.items = items;
                self.status = ListStatus::Ready;
                self.error_message = None;
                Ok(())
            }
            Err(err) => {
                self.status = ListStatus::Error;
                self.error_message = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Replace the record with the same id, or append it.
    fn upsert(&mut self, record: T) {
        match self.items.iter().position(|r| r.id() == record.id()) {
            Some(index) => self.items[index] = record,
            None => self.items.push(record),
        }
    }

    fn remove(&mut self, id: &RecordId) -> Option<T> {
        let index = self.items.iter().position(|r| r.id() == id)?;
        Some(self.items.remove(index))
    }
}

/// One back-office page: load, search, add/edit, delete.
///
/// Items only ever change from a successful server response. Search is
/// applied on read and never issues a request.
pub struct ListController<T> {
    resource: CollectionResource<T>,
    state: ListState<T>,
    search: SearchFilter,
    deletion: DeleteConfirmation<T>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Collection> core::fmt::Debug for ListController<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListController")
            .field("collection", &T::BASE_PATH)
            .field("status", &self.state.status)
            .field("items", &self.state.items.len())
            .field("search", &self.search.term())
            .finish_non_exhaustive()
    }
}

impl<T: Collection> ListController<T> {
    pub fn new(resource: CollectionResource<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            resource,
            state: ListState::default(),
            search: SearchFilter::default(),
            deletion: DeleteConfirmation::new(),
            notifier,
        }
    }

    pub fn resource(&self) -> &CollectionResource<T> {
        &self.resource
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        self.state.items()
    }

    pub fn status(&self) -> ListStatus {
        self.state.status()
    }

    /// First load. Only runs from `Idle`.
    pub async fn mount(&mut self) -> ClientResult<()> {
        if self.state.status != ListStatus::Idle {
            return Ok(());
        }
        self.load().await
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.load().await
    }

    /// Reload after a failed load. No-op in any other state.
    pub async fn retry(&mut self) -> ClientResult<()> {
        if self.state.status != ListStatus::Error {
            return Ok(());
        }
        self.load().await
    }

    async fn load(&mut self) -> ClientResult<()> {
        self.state.begin_load();
        let result = self.resource.list().await;
        match &result {
            Ok(items) => tracing::info!(collection = T::BASE_PATH, count = items.len(), "list loaded"),
            Err(err) => tracing::warn!(collection = T::BASE_PATH, error = %err, "list load failed"),
        }
        self.state.resolve(result)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search.set(term);
    }

    pub fn search_term(&self) -> &str {
        self.search.term()
    }

    /// Items matching the current search, in server order.
    pub fn visible_items(&self) -> Vec<&T> {
        self.search.apply(self.state.items())
    }

    pub fn deletion(&self) -> &DeleteConfirmation<T> {
        &self.deletion
    }

    pub fn request_delete(&mut self, record: T) -> bool {
        self.deletion.open(record)
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.deletion.cancel()
    }

    /// Delete the pending record. On failure the dialog stays open, the
    /// list is untouched and an error notice is raised.
    pub async fn confirm_delete(&mut self) -> Result<T, ConfirmError> {
        let id = self.deletion.begin_confirm()?;
        let result = self.resource.delete_by_id(&id).await;

        match self.deletion.finish(result) {
            Ok(removed) => {
                self.state.remove(&id);
                self.notifier.notify(Notice::success(format!(
                    "\"{}\" was deleted",
                    removed.display_name()
                )));
                Ok(removed)
            }
            Err(err) => {
                self.notifier.notify(Notice::error(err.user_message()));
                Err(ConfirmError::Rejected(err))
            }
        }
    }
}

impl<T: Form> ListController<T> {
    /// Submit `modal`, splice the acknowledged record into the list, then
    /// reload. A rejected submission leaves the list exactly as it was, and
    /// an edit with no changes just closes the form.
    pub async fn save(&mut self, modal: &mut MutationModal<T>) -> Result<T, SubmitError> {
        let submission = modal.begin_submit()?;
        let sent = submission.is_request();
        let result = submission.send(&self.resource).await;
        let saved = modal.finish_submit(result)?;
        if !sent {
            return Ok(saved);
        }

        self.state.upsert(saved.clone());
        self.notifier
            .notify(Notice::success(format!("{} saved", capitalized(T::LABEL))));

        if let Err(err) = self.refresh().await {
            self.notifier.notify(Notice::error(format!(
                "Saved, but the list could not be reloaded: {}",
                err.user_message()
            )));
        }
        Ok(saved)
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

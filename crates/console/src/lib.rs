//! `grocerdesk-console`
//!
//! **Responsibility:** the list / edit / delete lifecycle shared by every
//! back-office page, written once over `CollectionResource<T>`.
//!
//! - `ListController<T>` owns a page's records, load status and search term
//! - `MutationModal<T>` stages an add/edit draft and guards submission
//! - `DeleteConfirmation<T>` is the two-step delete guard
//! - `Notifier` receives transient success/failure notices
//!
//! A page is configured by implementing `Collection` and `Form` for its
//! record type; nothing here is domain specific.

pub mod delete;
pub mod form;
pub mod list;
pub mod modal;
pub mod notice;
pub mod search;

pub use delete::{ConfirmError, DeleteConfirmation};
pub use form::{Draft, Form, StagedAttachment, Validator};
pub use list::{ListController, ListState, ListStatus};
pub use modal::{ModalMode, MutationModal, SubmitError, Submission};
pub use notice::{Notice, NoticeLevel, NoticeLog, Notifier, TracingNotifier};
pub use search::SearchFilter;

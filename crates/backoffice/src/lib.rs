//! `grocerdesk-backoffice`
//!
//! The grocery back office assembled from the generic pieces: one record
//! type per collection, the configuration loader, and `BackOffice`, which
//! wires session, transport and notifier together and hands out resources,
//! list controllers and modals.

pub mod app;
pub mod config;
pub mod domain;

pub use app::BackOffice;
pub use config::BackOfficeConfig;

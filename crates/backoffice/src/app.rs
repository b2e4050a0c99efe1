//! Application state shared by every page.

use std::sync::Arc;

use anyhow::{Context, Result};
use grocerdesk_auth::{Session, SessionHandle, SessionStore};
use grocerdesk_client::{ApiClient, Collection, CollectionResource, HttpTransport, Transport};
use grocerdesk_console::{Form, ListController, MutationModal, Notifier, TracingNotifier};

use crate::config::BackOfficeConfig;
use crate::domain::{Category, CouponFormOptions, Product};

/// One signed-in back-office instance.
///
/// Owns the session store; every resource and controller it hands out reads
/// the same session through the same `ApiClient`.
#[derive(Clone)]
pub struct BackOffice {
    config: BackOfficeConfig,
    sessions: SessionStore,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl core::fmt::Debug for BackOffice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackOffice")
            .field("api_url", &self.config.api_url)
            .field("signed_in", &self.sessions.handle().is_signed_in())
            .finish_non_exhaustive()
    }
}

impl BackOffice {
    /// Install logging and connect to the configured API over HTTP.
    pub fn bootstrap(config: BackOfficeConfig) -> Result<Self> {
        grocerdesk_observability::init(&config.log);

        let transport = HttpTransport::new(&config.http_config())
            .with_context(|| format!("failed to create HTTP client for {}", config.api_url))?;

        tracing::info!(
            api_url = %config.api_url,
            timeout_secs = config.request_timeout_secs,
            "back office ready"
        );
        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            Arc::new(TracingNotifier),
        ))
    }

    /// Build on any transport, e.g. the in-memory API.
    pub fn with_transport(
        config: BackOfficeConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let sessions = SessionStore::new();
        let api = ApiClient::new(transport, sessions.handle());
        Self {
            config,
            sessions,
            api,
            notifier,
        }
    }

    pub fn config(&self) -> &BackOfficeConfig {
        &self.config
    }

    pub fn login(&self, session: Session) {
        self.sessions.login(session);
    }

    pub fn logout(&self) {
        self.sessions.logout();
    }

    pub fn session(&self) -> SessionHandle {
        self.sessions.handle()
    }

    pub fn resource<T: Collection>(&self) -> CollectionResource<T> {
        CollectionResource::new(self.api.clone())
    }

    /// A fresh, unmounted controller for `T`'s page.
    pub fn controller<T: Collection>(&self) -> ListController<T> {
        ListController::new(self.resource(), self.notifier.clone())
    }

    /// Blank add form using the configured upload limits.
    pub fn add_modal<T: Form>(&self) -> MutationModal<T> {
        MutationModal::add().with_upload_policy(self.config.upload.clone())
    }

    pub fn edit_modal<T: Form>(&self, record: &T) -> MutationModal<T> {
        MutationModal::edit(record).with_upload_policy(self.config.upload.clone())
    }

    /// Category and product pick lists for the coupon form, fetched together.
    pub async fn coupon_form_options(&self) -> CouponFormOptions {
        CouponFormOptions::load(&self.resource::<Category>(), &self.resource::<Product>()).await
    }
}

//! Add / edit dialog state.

use grocerdesk_client::{
    Attachment, Collection, CollectionResource, Payload, UploadPolicy, UploadRejected,
};
use grocerdesk_core::{ClientError, ClientResult, FieldErrors, RecordId};
use serde_json::Value;
use thiserror::Error;

use crate::form::{Draft, Form};

#[derive(Debug, Clone, PartialEq)]
pub enum ModalMode<T> {
    Add,
    Edit(T),
}

/// The request a modal decided to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    Create(Payload),
    Update { id: RecordId, payload: Payload },
    /// An edit with nothing changed; the record is returned as it was.
    Unchanged(T),
}

impl<T: Collection> Submission<T> {
    pub async fn send(self, resource: &CollectionResource<T>) -> ClientResult<T> {
        match self {
            Submission::Create(payload) => resource.create(payload).await,
            Submission::Update { id, payload } => resource.update(&id, payload).await,
            Submission::Unchanged(record) => Ok(record),
        }
    }

    /// Whether sending this goes over the network.
    pub fn is_request(&self) -> bool {
        !matches!(self, Submission::Unchanged(_))
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("the form is closed")]
    Closed,

    #[error("a submission is already in flight")]
    InFlight,

    #[error("{} field(s) need attention", .0.len())]
    Invalid(FieldErrors),

    #[error(transparent)]
    Rejected(#[from] ClientError),
}

/// One open add or edit form.
///
/// Submission is two-phase: `begin_submit` validates and locks the form,
/// `finish_submit` applies the server's answer. `submit` runs both.
#[derive(Debug, Clone)]
pub struct MutationModal<T> {
    mode: ModalMode<T>,
    draft: Draft,
    errors: FieldErrors,
    error_message: Option<String>,
    submitting: bool,
    open: bool,
    upload_policy: UploadPolicy,
}

impl<T: Form> MutationModal<T> {
    pub fn add() -> Self {
        Self::open_with(ModalMode::Add, Draft::new(T::template()))
    }

    pub fn edit(record: &T) -> Self {
        Self::open_with(
            ModalMode::Edit(record.clone()),
            Draft::for_edit(record.edit_values()),
        )
    }

    fn open_with(mode: ModalMode<T>, draft: Draft) -> Self {
        Self {
            mode,
            draft,
            errors: FieldErrors::new(),
            error_message: None,
            submitting: false,
            open: true,
            upload_policy: UploadPolicy::default(),
        }
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    pub fn mode(&self) -> &ModalMode<T> {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.open && !self.submitting
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message from the last rejected submission.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Edit a value and clear any stale error on that field.
    pub fn set_field(&mut self, field: &str, value: impl Into<Value>) {
        self.draft.set(field, value);
        self.errors.remove(field);
    }

    /// Stage a file for `field` and return its preview URL. A rejected file
    /// becomes a field error and leaves the previous file staged.
    pub fn stage_file(
        &mut self,
        field: &str,
        attachment: Attachment,
    ) -> Result<String, UploadRejected> {
        match self.draft.stage(field, attachment, &self.upload_policy) {
            Ok(staged) => {
                let preview = staged.preview_url.clone();
                self.errors.remove(field);
                Ok(preview)
            }
            Err(rejected) => {
                self.errors.remove(field);
                self.errors.insert(field, rejected.to_string());
                Err(rejected)
            }
        }
    }

    pub fn remove_file(&mut self, field: &str) {
        self.draft.unstage(field);
    }

    /// Re-check the whole draft. Replaces any previous field errors.
    pub fn validate(&mut self) -> &FieldErrors {
        self.errors = T::validate(&self.draft);
        &self.errors
    }

    /// Whether submitting would send anything. Always true when adding.
    pub fn has_changes(&self) -> bool {
        match self.mode {
            ModalMode::Add => true,
            ModalMode::Edit(_) => self.draft.is_dirty(),
        }
    }

    pub fn begin_submit(&mut self) -> Result<Submission<T>, SubmitError> {
        if !self.open {
            return Err(SubmitError::Closed);
        }
        if self.submitting {
            return Err(SubmitError::InFlight);
        }
        if !self.validate().is_empty() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        self.submitting = true;
        self.error_message = None;

        let payload = self.draft.to_payload();
        Ok(match &self.mode {
            ModalMode::Add => Submission::Create(payload),
            ModalMode::Edit(record) if !self.draft.is_dirty() => {
                Submission::Unchanged(record.clone())
            }
            ModalMode::Edit(record) => Submission::Update {
                id: record.id().clone(),
                payload,
            },
        })
    }

    /// Close on success; otherwise stay open with the server's message and
    /// field errors, ready for another attempt.
    pub fn finish_submit(&mut self, result: ClientResult<T>) -> Result<T, SubmitError> {
        self.submitting = false;
        match result {
            Ok(record) => {
                tracing::info!(collection = T::BASE_PATH, id = %record.id(), "saved");
                self.close();
                Ok(record)
            }
            Err(err) => {
                self.error_message = Some(err.user_message());
                if let Some(fields) = err.field_errors() {
                    self.errors.merge(fields.clone());
                }
                Err(SubmitError::Rejected(err))
            }
        }
    }

    pub async fn submit(&mut self, resource: &CollectionResource<T>) -> Result<T, SubmitError> {
        let submission = self.begin_submit()?;
        let result = submission.send(resource).await;
        self.finish_submit(result)
    }

    /// Discard the draft. Never touches the network.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.open = false;
        self.draft = Draft::default();
        self.errors.clear();
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::form::Validator;
    use grocerdesk_auth::SessionStore;
    use grocerdesk_client::{
        ApiClient, ApiResponse, AuthPolicy, Envelope, InMemoryTransport, Method,
        RequestBody,
    };
    use grocerdesk_core::GENERIC_FAILURE_MESSAGE;
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, json};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Aisle {
        #[serde(alias = "_id")]
        id: RecordId,
        name: String,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        position: i64,
    }

    impl Collection for Aisle {
        const BASE_PATH: &'static str = "/aisles";
        const LABEL: &'static str = "aisle";
        const AUTH: AuthPolicy = AuthPolicy::Public;
        const LIST_ENVELOPE: Envelope = Envelope::Data;
        const RECORD_ENVELOPE: Envelope = Envelope::Data;

        fn id(&self) -> &RecordId {
            &self.id
        }

        fn display_name(&self) -> &str {
            &self.name
        }
    }

    impl Form for Aisle {
        fn template() -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("name".into(), json!(""));
            map.insert("position".into(), json!(0));
            map
        }

        fn validate(draft: &Draft) -> FieldErrors {
            let v = Validator::new(draft)
                .required("name", "Name is required")
                .non_negative("position", "Position cannot be negative");
            if draft.is_new() {
                v.file_required("image", "Image is required").finish()
            } else {
                v.finish()
            }
        }
    }

    fn setup() -> (Arc<InMemoryTransport>, CollectionResource<Aisle>) {
        let backend = Arc::new(InMemoryTransport::new());
        backend.seed([Aisle {
            id: RecordId::new("a"),
            name: "Fruits".into(),
            image: Some("https://cdn/a.png".into()),
            position: 1,
        }]);
        let api = ApiClient::new(backend.clone(), SessionStore::new().handle());
        (backend, CollectionResource::new(api))
    }

    fn png() -> Attachment {
        Attachment::new("aisle.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn empty_add_form_reports_all_missing_fields() {
        let mut modal = MutationModal::<Aisle>::add();
        modal.set_field("position", -3);

        match modal.begin_submit() {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), ["image", "name", "position"]);
            }
            other => panic!("expected invalid, got {other:?}"),
        }
        assert!(modal.can_submit());
    }

    #[test]
    fn second_begin_is_refused_while_in_flight() {
        let mut modal = MutationModal::<Aisle>::add();
        modal.set_field("name", "Bakery");
        modal.stage_file("image", png()).unwrap();

        assert!(matches!(modal.begin_submit(), Ok(Submission::Create(_))));
        assert!(!modal.can_submit());
        assert!(matches!(modal.begin_submit(), Err(SubmitError::InFlight)));
    }

    #[test]
    fn rejected_file_is_a_field_error() {
        let mut modal = MutationModal::<Aisle>::add().with_upload_policy(UploadPolicy {
            max_bytes: 2,
            ..UploadPolicy::default()
        });
        assert!(modal.stage_file("image", png()).is_err());
        assert!(modal.errors().get("image").unwrap().contains("too large"));
        assert!(modal.draft().staged("image").is_none());
    }

    #[tokio::test]
    async fn add_sends_multipart_and_closes() {
        let (backend, aisles) = setup();
        let mut modal = MutationModal::<Aisle>::add();
        modal.set_field("name", "Bakery");
        let preview = modal.stage_file("image", png()).unwrap();
        assert!(preview.starts_with("blob:"));

        let created = modal.submit(&aisles).await.unwrap();

        assert_eq!(created.name, "Bakery");
        assert_eq!(created.image.as_deref(), Some("memory://uploads/aisle.png"));
        assert!(!modal.is_open());
        let request = backend.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        let form = request.body.as_multipart().unwrap();
        assert_eq!(form.file("image").unwrap().bytes, png().bytes);
    }

    #[tokio::test]
    async fn edit_patches_only_changed_fields() {
        let (backend, aisles) = setup();
        let record = backend.records::<Aisle>().remove(0);
        let mut modal = MutationModal::edit(&record);
        modal.set_field("position", 4);

        let updated = modal.submit(&aisles).await.unwrap();

        assert_eq!(updated.position, 4);
        assert_eq!(updated.name, "Fruits");
        let request = backend.last_request().unwrap();
        assert_eq!(request.path, "/aisles/update/a");
        assert_eq!(request.body, RequestBody::Json(json!({ "position": 4 })));
    }

    #[tokio::test]
    async fn server_message_is_shown_verbatim_and_modal_stays_open() {
        let (backend, aisles) = setup();
        backend.respond_next(ApiResponse::json_value(
            422,
            &json!({ "message": "Aisle name already exists", "errors": { "name": "taken" } }),
        ));
        let mut modal = MutationModal::<Aisle>::add();
        modal.set_field("name", "Fruits");
        modal.stage_file("image", png()).unwrap();

        let err = modal.submit(&aisles).await.unwrap_err();

        assert!(matches!(err, SubmitError::Rejected(ClientError::Validation { .. })));
        assert!(modal.is_open());
        assert!(modal.can_submit());
        assert_eq!(modal.error_message(), Some("Aisle name already exists"));
        assert_eq!(modal.errors().get("name"), Some("taken"));
        assert_eq!(modal.draft().text("name"), Some("Fruits"));
        assert_eq!(backend.records::<Aisle>().len(), 1);
    }

    #[tokio::test]
    async fn failure_without_message_uses_fallback() {
        let (backend, aisles) = setup();
        backend.respond_next(ApiResponse::new(500, ""));
        let mut modal = MutationModal::edit(&backend.records::<Aisle>()[0]);
        modal.set_field("name", "Fresh Fruits");

        assert!(modal.submit(&aisles).await.is_err());
        assert_eq!(modal.error_message(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(GENERIC_FAILURE_MESSAGE, "Something went wrong. Please try again.");
    }

    #[tokio::test]
    async fn cancel_makes_no_request() {
        let (backend, _aisles) = setup();
        let mut modal = MutationModal::edit(&backend.records::<Aisle>()[0]);
        modal.set_field("name", "Changed");

        modal.cancel();

        assert!(!modal.is_open());
        assert_eq!(backend.request_count(), 0);
        assert!(matches!(modal.begin_submit(), Err(SubmitError::Closed)));
    }

    #[tokio::test]
    async fn untouched_edit_closes_without_a_request() {
        let (backend, aisles) = setup();
        let record = backend.records::<Aisle>()[0].clone();
        let mut modal = MutationModal::edit(&record);
        modal.set_field("name", "Fruits");
        assert!(!modal.has_changes());

        let saved = modal.submit(&aisles).await.unwrap();

        assert_eq!(saved, record);
        assert!(!modal.is_open());
        assert_eq!(backend.request_count(), 0);
    }
}

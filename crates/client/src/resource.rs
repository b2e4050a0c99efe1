//! Generic remote collection: one implementation for every domain.

use std::marker::PhantomData;

use grocerdesk_core::{ClientError, ClientResult, RecordId};
use serde_json::Value;

use crate::api::ApiClient;
use crate::collection::Collection;
use crate::payload::Payload;
use crate::transport::{ApiResponse, Method, RequestBody};

/// CRUD access to the collection described by `T`.
///
/// Routes are `{base}/get`, `{base}/get/{id}`, `{base}/create`,
/// `{base}/update/{id}` and `{base}/delete/{id}`. Every failure is logged here
/// and handed back to the caller unchanged.
pub struct CollectionResource<T> {
    api: ApiClient,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionResource<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Collection> core::fmt::Debug for CollectionResource<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollectionResource")
            .field("base_path", &T::BASE_PATH)
            .finish()
    }
}

impl<T: Collection> CollectionResource<T> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _record: PhantomData,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// All records, in server order. An empty collection is not an error.
    #[tracing::instrument(skip_all, fields(collection = T::BASE_PATH))]
    pub async fn list(&self) -> ClientResult<Vec<T>> {
        let response = self
            .api
            .send(Method::Get, format!("{}/get", T::BASE_PATH), RequestBody::Empty, T::AUTH)
            .await?;

        decode_list::<T>(&response).inspect_err(|err| {
            tracing::error!(error = %err, "failed to decode {} list", T::LABEL);
        })
    }

    #[tracing::instrument(skip_all, fields(collection = T::BASE_PATH, id = %id))]
    pub async fn get_by_id(&self, id: &RecordId) -> ClientResult<T> {
        let response = self
            .api
            .send(
                Method::Get,
                record_path::<T>("get", id),
                RequestBody::Empty,
                T::AUTH,
            )
            .await?;

        decode_record::<T>(&response).inspect_err(|err| {
            tracing::error!(error = %err, "failed to decode {}", T::LABEL);
        })
    }

    /// Create a record; the server assigns its identifier.
    #[tracing::instrument(skip_all, fields(collection = T::BASE_PATH, multipart = payload.has_attachments()))]
    pub async fn create(&self, payload: Payload) -> ClientResult<T> {
        let response = self
            .api
            .send(
                Method::Post,
                format!("{}/create", T::BASE_PATH),
                payload.into_body(),
                T::AUTH,
            )
            .await?;

        let created = decode_record::<T>(&response).inspect_err(|err| {
            tracing::error!(error = %err, "failed to decode created {}", T::LABEL);
        })?;
        tracing::info!(id = %created.id(), "{} created", T::LABEL);
        Ok(created)
    }

    /// Partial update: only the fields in `payload` are sent.
    #[tracing::instrument(skip_all, fields(collection = T::BASE_PATH, id = %id))]
    pub async fn update(&self, id: &RecordId, payload: Payload) -> ClientResult<T> {
        let response = self
            .api
            .send(
                Method::Patch,
                record_path::<T>("update", id),
                payload.into_body(),
                T::AUTH,
            )
            .await?;

        let updated = decode_record::<T>(&response).inspect_err(|err| {
            tracing::error!(error = %err, "failed to decode updated {}", T::LABEL);
        })?;
        tracing::info!("{} updated", T::LABEL);
        Ok(updated)
    }

    /// Delete by id. Deleting an id that is already gone yields `NotFound`.
    #[tracing::instrument(skip_all, fields(collection = T::BASE_PATH, id = %id))]
    pub async fn delete_by_id(&self, id: &RecordId) -> ClientResult<()> {
        self.api
            .send(
                Method::Delete,
                record_path::<T>("delete", id),
                RequestBody::Empty,
                T::AUTH,
            )
            .await?;

        tracing::info!("{} deleted", T::LABEL);
        Ok(())
    }
}

fn decode_list<T: Collection>(response: &ApiResponse) -> ClientResult<Vec<T>> {
    let inner = unwrap_body(response, T::LIST_ENVELOPE)?;
    if inner.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(inner)
        .map_err(|e| ClientError::unexpected_shape(response.status, e.to_string()))
}

fn decode_record<T: Collection>(response: &ApiResponse) -> ClientResult<T> {
    let inner = unwrap_body(response, T::RECORD_ENVELOPE)?;
    serde_json::from_value(inner)
        .map_err(|e| ClientError::unexpected_shape(response.status, e.to_string()))
}

fn unwrap_body(response: &ApiResponse, envelope: crate::Envelope) -> ClientResult<Value> {
    let body = response
        .json()
        .map_err(|e| ClientError::unexpected_shape(response.status, e.to_string()))?;
    Ok(envelope.unwrap(body))
}

/// `{base}/{action}/{id}` with the id encoded as one path segment.
fn record_path<T: Collection>(action: &str, id: &RecordId) -> String {
    format!("{}/{action}/{}", T::BASE_PATH, urlencoding::encode(id.as_str()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use grocerdesk_auth::{Role, Session, SessionStore};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::{Attachment, AuthPolicy, Envelope, InMemoryTransport};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Aisle {
        #[serde(alias = "_id")]
        id: RecordId,
        name: String,
        #[serde(default)]
        image: Option<String>,
    }

    impl Collection for Aisle {
        const BASE_PATH: &'static str = "/aisles";
        const LABEL: &'static str = "aisle";
        const AUTH: AuthPolicy = AuthPolicy::Public;
        const LIST_ENVELOPE: Envelope = Envelope::Named("aisles");
        const RECORD_ENVELOPE: Envelope = Envelope::Data;

        fn id(&self) -> &RecordId {
            &self.id
        }

        fn display_name(&self) -> &str {
            &self.name
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Voucher {
        id: RecordId,
        code: String,
    }

    impl Collection for Voucher {
        const BASE_PATH: &'static str = "/vouchers";
        const LABEL: &'static str = "voucher";
        const AUTH: AuthPolicy = AuthPolicy::Bearer;
        const LIST_ENVELOPE: Envelope = Envelope::Bare;
        const RECORD_ENVELOPE: Envelope = Envelope::Bare;

        fn id(&self) -> &RecordId {
            &self.id
        }

        fn display_name(&self) -> &str {
            &self.code
        }
    }

    fn aisle(id: &str, name: &str) -> Aisle {
        Aisle {
            id: RecordId::new(id),
            name: name.to_string(),
            image: None,
        }
    }

    fn resource<T: Collection>(
        backend: &Arc<InMemoryTransport>,
        sessions: &SessionStore,
    ) -> CollectionResource<T> {
        CollectionResource::new(ApiClient::new(backend.clone(), sessions.handle()))
    }

    #[tokio::test]
    async fn empty_collection_lists_as_empty_vec() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Aisle>();
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        assert_eq!(aisles.list().await.unwrap(), vec![]);
        let request = backend.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/aisles/get");
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn list_accepts_mongo_style_ids() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.respond_next(ApiResponse::json_value(
            200,
            &json!({ "aisles": [{ "_id": "65f1", "name": "Bakery" }] }),
        ));
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        let items = aisles.list().await.unwrap();
        assert_eq!(items, vec![aisle("65f1", "Bakery")]);
    }

    #[tokio::test]
    async fn unrecognised_list_body_is_a_server_error() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.respond_next(ApiResponse::json_value(200, &json!({ "data": [] })));
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        let err = aisles.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 200, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn create_returns_server_assigned_id() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Aisle>();
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        let created = aisles
            .create(Payload::new().field("name", "Frozen"))
            .await
            .unwrap();

        assert!(!created.id.as_str().is_empty());
        assert_eq!(created.name, "Frozen");
        assert_eq!(aisles.get_by_id(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn create_with_file_sends_binary_multipart_part() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Aisle>();
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());
        let png = Attachment::new("spring.png", "image/png", vec![0x89, b'P', b'N', b'G']);

        let created = aisles
            .create(Payload::new().field("name", "Spring Sale").attach("image", png.clone()))
            .await
            .unwrap();

        let request = backend.last_request().unwrap();
        assert_eq!(request.path, "/aisles/create");
        assert_eq!(request.body.content_type(), Some("multipart/form-data"));
        let form = request.body.as_multipart().unwrap();
        assert_eq!(form.file("image"), Some(&png));
        assert_eq!(form.text("name"), Some("Spring Sale"));
        assert_eq!(created.image.as_deref(), Some("memory://uploads/spring.png"));
    }

    #[tokio::test]
    async fn update_sends_only_the_given_fields() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.seed([aisle("x", "Dairy")]);
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        let updated = aisles
            .update(&RecordId::new("x"), Payload::new().field("image", "https://cdn/x.png"))
            .await
            .unwrap();

        let request = backend.last_request().unwrap();
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.path, "/aisles/update/x");
        assert_eq!(request.body.as_json(), Some(&json!({ "image": "https://cdn/x.png" })));
        assert_eq!(updated.name, "Dairy");
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.seed([aisle("a", "Fruits")]);
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());
        let id = RecordId::new("a");

        aisles.delete_by_id(&id).await.unwrap();
        let err = aisles.delete_by_id(&id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn protected_collection_sends_bearer_token() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Voucher>();
        let sessions = SessionStore::new();
        sessions.login(Session::new("tok-42", Role::admin()));
        let vouchers = resource::<Voucher>(&backend, &sessions);

        vouchers.list().await.unwrap();
        assert_eq!(backend.last_request().unwrap().bearer.as_deref(), Some("tok-42"));
    }

    #[tokio::test]
    async fn missing_token_still_sends_and_surfaces_auth_error() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Voucher>();
        let vouchers = resource::<Voucher>(&backend, &SessionStore::new());

        let err = vouchers.list().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(backend.request_count(), 1);
        assert_eq!(backend.last_request().unwrap().bearer, None);
    }

    #[tokio::test]
    async fn public_collection_never_sends_token() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Aisle>();
        let sessions = SessionStore::new();
        sessions.login(Session::new("tok", Role::admin()));
        let aisles = resource::<Aisle>(&backend, &sessions);

        aisles.list().await.unwrap();
        assert_eq!(backend.last_request().unwrap().bearer, None);
    }

    #[tokio::test]
    async fn network_failure_is_propagated() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.register::<Aisle>();
        backend.disconnect_next();
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        assert!(matches!(aisles.list().await, Err(ClientError::Network(_))));
    }

    #[tokio::test]
    async fn wrapped_collections_also_accept_bare_bodies() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.respond_next(ApiResponse::json_value(
            200,
            &json!([{ "_id": "a", "name": "Fruits" }]),
        ));
        backend.respond_next(ApiResponse::json_value(200, &json!({ "_id": "a", "name": "Fruits" })));
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        assert_eq!(aisles.list().await.unwrap(), vec![aisle("a", "Fruits")]);
        assert_eq!(
            aisles.get_by_id(&RecordId::new("a")).await.unwrap(),
            aisle("a", "Fruits")
        );
    }

    #[tokio::test]
    async fn record_ids_are_sent_as_a_single_path_segment() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.seed([aisle("a/b?x", "Odd one")]);
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());
        let id = RecordId::new("a/b?x");

        let fetched = aisles.get_by_id(&id).await.unwrap();
        assert_eq!(fetched.name, "Odd one");
        assert_eq!(backend.last_request().unwrap().path, "/aisles/get/a%2Fb%3Fx");

        aisles.delete_by_id(&id).await.unwrap();
        assert_eq!(backend.last_request().unwrap().path, "/aisles/delete/a%2Fb%3Fx");
        assert!(aisles.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_record_is_a_server_error() {
        let backend = Arc::new(InMemoryTransport::new());
        backend.respond_next(ApiResponse::json_value(200, &json!({ "data": { "name": 7 } })));
        let aisles = resource::<Aisle>(&backend, &SessionStore::new());

        let err = aisles.update(&RecordId::new("x"), Payload::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 200, .. }), "{err:?}");
    }
}

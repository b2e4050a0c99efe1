//! Session-aware request execution and error classification.

use std::sync::Arc;

use grocerdesk_auth::SessionHandle;
use grocerdesk_core::{ClientError, ClientResult, FieldErrors};
use serde::Deserialize;
use serde_json::Value;

use crate::collection::AuthPolicy;
use crate::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};

/// Shared handle used by every `CollectionResource`.
///
/// Cheap to clone; all clones share the transport and read the same session.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionHandle,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("signed_in", &self.session.is_signed_in())
            .finish_non_exhaustive()
    }
}

/// Error body returned by the API on 4xx.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    /// Some endpoints only send an `error` string.
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionHandle) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Send a request and return the response only if it was 2xx.
    pub async fn send(
        &self,
        method: Method,
        path: String,
        body: RequestBody,
        auth: AuthPolicy,
    ) -> ClientResult<ApiResponse> {
        let bearer = match auth {
            AuthPolicy::Public => None,
            AuthPolicy::Bearer => {
                let token = self.session.bearer_token();
                if token.is_none() {
                    tracing::warn!(%method, %path, "no session token; sending unauthenticated request");
                }
                token
            }
        };

        let request = ApiRequest {
            method,
            path,
            body,
            bearer,
        };
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await.inspect_err(|err| {
            tracing::error!(%method, %path, error = %err, "request did not complete");
        })?;

        if response.is_success() {
            tracing::debug!(%method, %path, status = response.status, "request succeeded");
            return Ok(response);
        }

        let err = error_from_response(&response);
        tracing::warn!(%method, %path, status = response.status, error = %err, "request rejected");
        Err(err)
    }
}

/// Classify a non-2xx response, keeping the server's message when it sent one.
pub fn error_from_response(response: &ApiResponse) -> ClientError {
    let envelope: ErrorEnvelope = response
        .json()
        .ok()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();

    ClientError::from_status(
        response.status,
        envelope.message.or(envelope.error),
        envelope.errors.as_ref().map(field_errors).unwrap_or_default(),
    )
}

/// Field messages from either `{ "field": "msg" }` or
/// `[{ "path": "field", "msg": "msg" }]` (`param`/`field` and `message` accepted).
fn field_errors(value: &Value) -> FieldErrors {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(field, msg)| message_text(msg).map(|m| (field.clone(), m)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let field = ["path", "param", "field"]
                    .iter()
                    .find_map(|key| item.get(key).and_then(Value::as_str))?;
                let msg = message_text(item)?;
                Some((field.to_string(), msg))
            })
            .collect(),
        _ => FieldErrors::new(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => ["msg", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

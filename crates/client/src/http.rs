//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use grocerdesk_core::{ClientError, FieldErrors};

use crate::payload::{MultipartForm, PartValue};
use crate::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};

/// Where the API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub api_url: String,
    /// `None` leaves reqwest's default (no overall timeout).
    pub timeout: Option<Duration>,
}

impl HttpConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(reqwest_method(request.method), &url);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(reqwest_form(form)?),
        };

        let resp = builder.send().await.map_err(network_error)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(network_error)?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, ClientError> {
    let mut out = reqwest::multipart::Form::new();
    for part in form.parts {
        out = match part.value {
            PartValue::Text(text) => out.text(part.name, text),
            PartValue::File(file) => {
                let body = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|_| {
                        let message = format!("invalid content type '{}'", file.content_type);
                        let mut fields = FieldErrors::new();
                        fields.insert(part.name.clone(), message.clone());
                        ClientError::Validation { message, fields }
                    })?;
                out.part(part.name, body)
            }
        };
    }
    Ok(out)
}

fn network_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::network(format!("request timed out: {err}"))
    } else {
        ClientError::network(err.to_string())
    }
}

//! Request payloads: scalar fields plus optional file attachments.
//!
//! A payload without attachments goes out as a JSON object. As soon as one
//! file is attached the whole payload is sent as `multipart/form-data`, with
//! scalar fields as text parts and files as binary parts.

use grocerdesk_core::{ClientError, ClientResult, FieldErrors};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::transport::RequestBody;

/// A file held in memory until submit.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Bytes are elided; images make the derived output unreadable.
impl core::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    File(Attachment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub value: PartValue,
}

/// Ordered multipart body, independent of any HTTP library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<Part>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::Text(text) if p.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn file(&self, name: &str) -> Option<&Attachment> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::File(file) if p.name == name => Some(file),
            _ => None,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }
}

/// Fields and files for a create or update call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub fields: Map<String, Value>,
    pub attachments: Vec<(String, Attachment)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            attachments: Vec::new(),
        }
    }

    /// Build a payload from any serializable struct that encodes as an object.
    pub fn from_serialize<S: Serialize>(value: &S) -> ClientResult<Self> {
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => Ok(Self::from_fields(fields)),
            Ok(other) => Err(invalid_payload(format!(
                "payload must serialize to an object, got {other}"
            ))),
            Err(e) => Err(invalid_payload(format!("failed to serialize payload: {e}"))),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn attach(mut self, name: impl Into<String>, attachment: Attachment) -> Self {
        self.attachments.push((name.into(), attachment));
        self
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.attachments.is_empty()
    }

    pub fn into_body(self) -> RequestBody {
        if self.attachments.is_empty() {
            return RequestBody::Json(Value::Object(self.fields));
        }

        let mut form = MultipartForm::default();
        for (name, value) in self.fields {
            // A file staged for the same field replaces the stored URL.
            if self.attachments.iter().any(|(field, _)| *field == name) {
                continue;
            }
            if let Some(text) = multipart_text(&value) {
                form.parts.push(Part {
                    name,
                    value: PartValue::Text(text),
                });
            }
        }
        for (name, attachment) in self.attachments {
            form.parts.push(Part {
                name,
                value: PartValue::File(attachment),
            });
        }

        RequestBody::Multipart(form)
    }
}

fn invalid_payload(message: String) -> ClientError {
    ClientError::Validation {
        message,
        fields: FieldErrors::new(),
    }
}

/// Text form of a JSON value inside a multipart body.
///
/// Strings go out raw, numbers and booleans in their JSON spelling, arrays and
/// objects as JSON text. `null` fields are omitted.
fn multipart_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(value.to_string())
        }
    }
}

//! Upload limits applied to every staged file, whatever the collection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payload::Attachment;

const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    /// Accepted MIME types, compared case-insensitively.
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_types: ["image/jpeg", "image/png", "image/webp", "image/gif"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadRejected {
    #[error("the selected file is empty")]
    Empty,

    #[error("file is too large ({size} bytes, limit is {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("file type '{0}' is not allowed")]
    UnsupportedType(String),
}

impl UploadPolicy {
    pub fn check(&self, attachment: &Attachment) -> Result<(), UploadRejected> {
        let size = attachment.len() as u64;
        if size == 0 {
            return Err(UploadRejected::Empty);
        }
        if size > self.max_bytes {
            return Err(UploadRejected::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        let content_type = attachment.content_type.trim();
        if !self
            .allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
        {
            return Err(UploadRejected::UnsupportedType(content_type.to_string()));
        }

        Ok(())
    }
}

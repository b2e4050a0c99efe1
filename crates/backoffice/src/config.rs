//! Runtime configuration.
//!
//! Resolved in this order: a TOML file named by `GROCERDESK_CONFIG` (or
//! passed explicitly), then individual `GROCERDESK_*` environment variables
//! on top, then built-in defaults for anything still unset.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use grocerdesk_client::{HttpConfig, UploadPolicy};
use grocerdesk_observability::LogConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_VAR: &str = "GROCERDESK_CONFIG";

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackOfficeConfig {
    /// Base URL every collection path is appended to.
    pub api_url: String,
    /// `0` disables the client-side timeout.
    pub request_timeout_secs: u64,
    pub log: LogConfig,
    pub upload: UploadPolicy,
}

impl Default for BackOfficeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log: LogConfig::default(),
            upload: UploadPolicy::default(),
        }
    }
}

impl BackOfficeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config TOML")
    }

    /// Apply `GROCERDESK_*` variables read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("GROCERDESK_API_URL") {
            self.api_url = url;
        }
        if let Some(secs) = lookup("GROCERDESK_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("GROCERDESK_REQUEST_TIMEOUT_SECS is not a number: {secs:?}"))?;
        }
        if let Some(filter) = lookup("GROCERDESK_LOG") {
            self.log.filter = filter;
        }
        if let Some(json) = lookup("GROCERDESK_LOG_JSON") {
            self.log.json = parse_flag(&json)
                .with_context(|| format!("GROCERDESK_LOG_JSON is not a boolean: {json:?}"))?;
        }
        if let Some(bytes) = lookup("GROCERDESK_MAX_UPLOAD_BYTES") {
            self.upload.max_bytes = bytes
                .trim()
                .parse()
                .with_context(|| format!("GROCERDESK_MAX_UPLOAD_BYTES is not a number: {bytes:?}"))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("api_url must be an http(s) URL, got {:?}", self.api_url);
        }
        if self.upload.max_bytes == 0 {
            anyhow::bail!("upload.max_bytes must be greater than zero");
        }
        Ok(())
    }

    pub fn http_config(&self) -> HttpConfig {
        let config = HttpConfig::new(self.api_url.trim());
        match self.request_timeout_secs {
            0 => config,
            secs => config.with_timeout(Duration::from_secs(secs)),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

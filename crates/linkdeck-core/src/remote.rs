//! WebDAV backup client
//!
//! Pushes and pulls a [`BackupBundle`] as a single JSON file at
//! `<url>/linkdeck-backup.json`. Last writer wins; there is no merging on the
//! server side. Every request is bounded by the configured timeout.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::backup::{BackupBundle, BackupError};
use crate::config::Config;

/// File name of the bundle on the server
pub const BACKUP_FILE_NAME: &str = "linkdeck-backup.json";

/// WebDAV endpoint and credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote backup is not configured (set remote_url)")]
    NotConfigured,

    #[error("Remote backup is disabled (set remote_enabled = true)")]
    Disabled,

    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed for {url}")]
    Unauthorized { url: String },

    #[error("No backup found at {url}")]
    NotFound { url: String },

    #[error("Server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Remote backup is unreadable: {0}")]
    Decode(#[from] BackupError),
}

impl RemoteError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Timeout(_) | RemoteError::Request(_) => true,
            RemoteError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Client for one WebDAV backup location
pub struct WebDavClient {
    config: RemoteConfig,
    http: reqwest::Client,
    timeout: Duration,
}

impl WebDavClient {
    pub fn new(config: RemoteConfig, timeout: Duration) -> RemoteResult<Self> {
        let url = config.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RemoteError::InvalidUrl(config.url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linkdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http,
            timeout,
        })
    }

    /// Build a client from application config, requiring remote to be enabled
    pub fn from_config(config: &Config) -> RemoteResult<Self> {
        let remote = config.remote().ok_or(RemoteError::NotConfigured)?;
        if !remote.enabled {
            return Err(RemoteError::Disabled);
        }
        Self::new(remote, Duration::from_secs(config.remote_timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        self.config.url.trim()
    }

    /// Full URL of the bundle file
    pub fn backup_url(&self) -> String {
        join_url(self.base_url(), BACKUP_FILE_NAME)
    }

    /// Verify the endpoint is reachable and the credentials are accepted
    pub async fn check(&self) -> RemoteResult<()> {
        let method =
            Method::from_bytes(b"PROPFIND").map_err(|e| RemoteError::Request(e.to_string()))?;
        let url = self.base_url().to_string();

        let response = self
            .request(method, &url)
            .header("Depth", "0")
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        ensure_success(response.status(), &url)?;
        info!("Remote {} is reachable", url);
        Ok(())
    }

    /// Upload the bundle, overwriting any previous one
    pub async fn push(&self, bundle: &BackupBundle) -> RemoteResult<()> {
        let url = self.backup_url();
        let body = bundle.to_json()?;
        debug!("PUT {} ({} bytes)", url, body.len());

        let response = self
            .request(Method::PUT, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        ensure_success(response.status(), &url)?;
        info!("Pushed {} links to {}", bundle.links.len(), url);
        Ok(())
    }

    /// Download the current bundle
    pub async fn pull(&self) -> RemoteResult<BackupBundle> {
        let url = self.backup_url();
        debug!("GET {}", url);

        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        ensure_success(response.status(), &url)?;
        let text = response.text().await.map_err(|e| self.map_transport(e))?;
        let bundle = BackupBundle::parse(&text)?;

        info!("Pulled {} links from {}", bundle.links.len(), url);
        Ok(bundle)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        if self.config.username.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.config.username, Some(&self.config.password))
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Request(err.to_string())
        }
    }
}

/// Join a base URL and a file name with exactly one slash
pub fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name.trim_start_matches('/'))
}

fn ensure_success(status: StatusCode, url: &str) -> RemoteResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized {
            url: url.to_string(),
        },
        StatusCode::NOT_FOUND => RemoteError::NotFound {
            url: url.to_string(),
        },
        other => RemoteError::Status {
            status: other.as_u16(),
            url: url.to_string(),
        },
    })
}

//! Command Gateway
//!
//! Request/response calls against the backend's control endpoint. Failures
//! here are `CommandFailure` in the error taxonomy: they surface to the
//! caller as a `Result` and never touch the push channel.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::sync::messages::{DeviceInfo, ScanResponse, SetupRequest};

/// Failure of a control-endpoint call.
///
/// Clone-able (string-backed) so concurrent single-flight callers can all
/// observe the same failure.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// Backend unreachable or the request never completed
    #[error("backend unreachable: {0}")]
    Transport(String),
    /// Backend answered with a non-success status
    #[error("backend rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    /// Response body did not decode
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CommandError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CommandError::Decode(e.to_string())
        } else {
            CommandError::Transport(e.to_string())
        }
    }
}

/// Backend control endpoint operations
#[async_trait]
pub trait ControlApi: Send + Sync {
    /// `GET /scan?flush={flush}` — cached device list, or a forced rescan
    /// that blocks for several seconds when `flush` is set
    async fn scan(&self, flush: bool) -> Result<Vec<DeviceInfo>, CommandError>;

    /// `POST /setup` — configure referees and connect their devices
    async fn setup(&self, request: &SetupRequest) -> Result<(), CommandError>;

    /// `POST /reset` — zero all device counters
    async fn reset(&self) -> Result<(), CommandError>;

    /// `POST /teardown` — disconnect all devices and end the match
    async fn teardown(&self) -> Result<(), CommandError>;
}

/// HTTP implementation of the control endpoint
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway against the given base URL, e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_empty(&self, path: &str) -> Result<(), CommandError> {
        debug!(path, "control request");
        let response = self.http.post(self.endpoint(path)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CommandError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CommandError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ControlApi for HttpGateway {
    async fn scan(&self, flush: bool) -> Result<Vec<DeviceInfo>, CommandError> {
        debug!(flush, "scan request");
        let response = self
            .http
            .get(self.endpoint("/scan"))
            .query(&[("flush", flush)])
            .send()
            .await?;
        let body: ScanResponse = Self::check_status(response).await?.json().await?;
        Ok(body.devices)
    }

    async fn setup(&self, request: &SetupRequest) -> Result<(), CommandError> {
        debug!(referees = request.referees.len(), "setup request");
        let response = self
            .http
            .post(self.endpoint("/setup"))
            .json(request)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), CommandError> {
        self.post_empty("/reset").await
    }

    async fn teardown(&self) -> Result<(), CommandError> {
        self.post_empty("/teardown").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = HttpGateway::new("http://127.0.0.1:8000/");
        assert_eq!(gateway.endpoint("/scan"), "http://127.0.0.1:8000/scan");
    }

    #[test]
    fn test_command_error_display() {
        let rejected = CommandError::Rejected {
            status: 500,
            detail: "scan in progress".to_string(),
        };
        assert_eq!(
            rejected.to_string(),
            "backend rejected request (500): scan in progress"
        );

        let transport = CommandError::Transport("connection refused".to_string());
        assert!(transport.to_string().contains("connection refused"));
    }
}

use crate::{
    client::{interpret_response, AuthToken, MoveClient, MoveRequest, MoveResponse},
    config::SyncConfig,
    error::{Result, SyncError},
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// `MoveClient` backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpMoveClient {
    http: Client,
    base_url: Option<String>,
    token_header: String,
    timeout: Option<Duration>,
}

impl HttpMoveClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: None,
            token_header: config.token_header.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Resolves relative endpoint templates against `base_url`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn absolute_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{base}{url}"),
            _ => url.to_string(),
        }
    }
}

#[async_trait]
impl MoveClient for HttpMoveClient {
    async fn send_move(&self, request: &MoveRequest, token: &AuthToken) -> Result<MoveResponse> {
        let url = self.absolute_url(&request.url);

        let mut builder = self
            .http
            .post(&url)
            .header(self.token_header.as_str(), token.expose())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(request.form_body());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        // Error statuses may still carry a JSON rejection with a reason
        let parsed = interpret_response(&body);
        if !status.is_success() {
            tracing::debug!(%url, %status, "move endpoint returned error status");
            return match parsed {
                Ok(response) if !response.ok => Ok(response),
                _ => Err(SyncError::MalformedResponse(format!("status {status}"))),
            };
        }
        parsed
    }
}

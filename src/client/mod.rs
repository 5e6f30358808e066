//! The move RPC consumed by the board.
//!
//! One `POST` per completed drop to a URL built from the move-endpoint template,
//! with a form body `column_id=<column>&position=<index>` and a JSON reply of the
//! shape `{ ok, error?, from_count?, to_count? }`.

use crate::{
    domain::{ColumnId, TaskId},
    error::{Result, SyncError},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod http;

pub use http::HttpMoveClient;

/// URL template for the move endpoint, e.g. `/tasks/__TASK_ID__/move/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEndpoint {
    template: String,
    placeholder: String,
}

impl MoveEndpoint {
    pub fn new(template: impl Into<String>, placeholder: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let placeholder = placeholder.into();
        if placeholder.is_empty() || !template.contains(&placeholder) {
            return Err(SyncError::ConfigError(format!(
                "move endpoint {template:?} does not contain placeholder {placeholder:?}"
            )));
        }
        Ok(Self {
            template,
            placeholder,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes the (percent-encoded) task id into the template
    pub fn url_for(&self, task: &TaskId) -> String {
        self.template
            .replace(&self.placeholder, &urlencoding::encode(task.as_str()))
    }
}

/// Anti-forgery token sent as a header with every move request
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// One move request, issued exactly once per completed drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub url: String,
    pub task_id: TaskId,
    pub column_id: ColumnId,
    pub position: usize,
}

impl MoveRequest {
    pub fn new(
        endpoint: &MoveEndpoint,
        task_id: TaskId,
        column_id: ColumnId,
        position: usize,
    ) -> Self {
        Self {
            url: endpoint.url_for(&task_id),
            task_id,
            column_id,
            position,
        }
    }

    /// `application/x-www-form-urlencoded` body
    pub fn form_body(&self) -> String {
        format!(
            "column_id={}&position={}",
            urlencoding::encode(self.column_id.as_str()),
            self.position
        )
    }
}

/// Server reply to a move request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_count: Option<usize>,
}

impl MoveResponse {
    pub fn success(from_count: Option<usize>, to_count: Option<usize>) -> Self {
        Self {
            ok: true,
            error: None,
            from_count,
            to_count,
        }
    }

    pub fn rejected(error: Option<String>) -> Self {
        Self {
            ok: false,
            error,
            from_count: None,
            to_count: None,
        }
    }

    /// Splits a parsed reply into the committed counts or the rejection
    pub fn into_result(self) -> Result<MoveResponse> {
        if self.ok {
            Ok(self)
        } else {
            Err(SyncError::Rejected(self.error))
        }
    }
}

/// Parses a raw reply body. Anything that is not a JSON object with a boolean
/// `ok` field is a malformed response.
pub fn interpret_response(body: &str) -> Result<MoveResponse> {
    serde_json::from_str::<MoveResponse>(body)
        .map_err(|e| SyncError::MalformedResponse(e.to_string()))
}

/// Transport for move requests
#[async_trait]
pub trait MoveClient: Send + Sync {
    /// Sends the request once. Transport failures and unparseable replies are
    /// errors; a parsed reply is returned as-is, whether or not `ok` is set.
    async fn send_move(&self, request: &MoveRequest, token: &AuthToken) -> Result<MoveResponse>;
}

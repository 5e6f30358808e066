use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Settings shared by every board synchronized on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Header carrying the anti-forgery token on move requests
    pub token_header: String,
    /// Placeholder replaced by the task id in the move-endpoint template
    pub task_placeholder: String,
    /// Drag group prefix; the group for a board is `{prefix}-{board_id}`
    pub group_prefix: String,
    /// Notification text when the server gives no usable reason
    pub generic_error: String,
    pub notification_ttl_secs: u64,
    /// Unset means the request waits for the transport to resolve
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl SyncConfig {
    pub const CONFIG_FILE: &'static str = "taskboard.toml";

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no sync config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn group_name(&self, board_id: &str) -> String {
        format!("{}-{}", self.group_prefix, board_id)
    }

    fn validate(&self) -> Result<()> {
        if self.task_placeholder.is_empty() {
            return Err(crate::error::SyncError::ConfigError(
                "task_placeholder must not be empty".to_string(),
            ));
        }
        if self.token_header.trim().is_empty() {
            return Err(crate::error::SyncError::ConfigError(
                "token_header must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            token_header: "X-CSRFToken".to_string(),
            task_placeholder: "__TASK_ID__".to_string(),
            group_prefix: "board".to_string(),
            generic_error: "Could not move task. Please try again.".to_string(),
            notification_ttl_secs: 4,
            request_timeout_secs: None,
        }
    }
}

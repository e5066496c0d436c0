// Release check against a remote version manifest

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::version;

/// Payload of the `update-available` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub current: String,
    pub latest: String,
    /// Passed through as published; usually a list of strings.
    #[serde(default)]
    pub changelog: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VersionManifest {
    version: String,
    #[serde(default)]
    changelog: serde_json::Value,
}

/// Any difference counts as an update, including a remote that is older.
pub fn is_update_available(current: &str, latest: &str) -> bool {
    !latest.trim().is_empty() && latest.trim() != current.trim()
}

pub struct UpdateChecker {
    client: reqwest::Client,
    url: String,
    current: String,
}

impl UpdateChecker {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            current: version::VERSION.to_string(),
        })
    }

    /// Overrides the running version, e.g. for tests.
    pub fn with_current(mut self, current: impl Into<String>) -> Self {
        self.current = current.into();
        self
    }

    /// `Some` when the manifest names a different version.
    pub async fn check(&self) -> anyhow::Result<Option<UpdateInfo>> {
        let manifest: VersionManifest = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !is_update_available(&self.current, &manifest.version) {
            tracing::debug!(current = %self.current, "No update available");
            return Ok(None);
        }
        tracing::info!(
            current = %self.current,
            latest = %manifest.version,
            "Update available"
        );
        Ok(Some(UpdateInfo {
            current: self.current.clone(),
            latest: manifest.version,
            changelog: manifest.changelog,
        }))
    }
}

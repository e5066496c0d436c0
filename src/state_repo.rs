// SQLite key-value state: user settings and the network usage ledger.
// Values are JSON documents keyed by name; absent or undecodable keys read as defaults.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::mpsc;
use tracing::instrument;

use crate::models::NetworkUsage;
use crate::settings::Settings;

pub const SETTINGS_KEY: &str = "settings";
pub const NETWORK_USAGE_KEY: &str = "networkUsage";

/// Channel depth for queued state writes. Tiers drop a write rather than wait.
pub const STATE_WRITE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state key `{key}` holds invalid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A write for the state writer task.
#[derive(Debug, Clone, PartialEq)]
pub enum StateWrite {
    Settings(Settings),
    NetworkUsage(NetworkUsage),
}

pub struct StateRepo {
    pool: SqlitePool,
}

impl StateRepo {
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at INTEGER NOT NULL)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Raw lookup; `Ok(None)` for an absent key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.try_get("value")?;
        serde_json::from_str(&value)
            .map(Some)
            .map_err(|source| StateError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(&json)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stored settings, or defaults when absent or unreadable.
    #[instrument(skip(self), fields(repo = "state", operation = "load_settings"))]
    pub async fn load_settings(&self) -> Settings {
        self.get_or_default(SETTINGS_KEY).await
    }

    #[instrument(skip(self, settings), fields(repo = "state", operation = "save_settings"))]
    pub async fn save_settings(&self, settings: &Settings) -> anyhow::Result<()> {
        self.put(SETTINGS_KEY, settings).await
    }

    #[instrument(skip(self), fields(repo = "state", operation = "load_network_usage"))]
    pub async fn load_network_usage(&self) -> NetworkUsage {
        self.get_or_default(NETWORK_USAGE_KEY).await
    }

    #[instrument(skip(self, usage), fields(repo = "state", operation = "save_network_usage"))]
    pub async fn save_network_usage(&self, usage: &NetworkUsage) -> anyhow::Result<()> {
        self.put(NETWORK_USAGE_KEY, usage).await
    }

    async fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key).await {
            Ok(Some(v)) => v,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(error = %e, key, "Falling back to defaults for stored state");
                T::default()
            }
        }
    }
}

/// Drains state writes into the repo until every sender is dropped.
pub fn spawn_state_writer(
    mut write_rx: mpsc::Receiver<StateWrite>,
    repo: Arc<StateRepo>,
    writes_total: Arc<AtomicU64>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(write) = write_rx.recv().await {
            let result = match &write {
                StateWrite::Settings(s) => repo.save_settings(s).await,
                StateWrite::NetworkUsage(u) => repo.save_network_usage(u).await,
            };
            match result {
                Ok(()) => {
                    writes_total.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::warn!(error = %e, operation = "state_write", "state writer: save failed");
                }
            }
        }
        tracing::debug!("State writer shutting down");
    })
}

/// Queues a write without waiting. A full or closed channel drops the write.
pub fn queue_write(tx: &mpsc::Sender<StateWrite>, write: StateWrite) {
    match tx.try_send(write) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(operation = "state_write", "State writer behind; dropping write");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!(operation = "state_write", "State writer channel closed");
        }
    }
}

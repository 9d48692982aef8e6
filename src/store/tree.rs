//! Document-tree operations and live-read subscriptions.

use std::collections::BTreeMap;

use sqlx::Row;
use tokio::sync::watch;

use crate::errors::AppError;

use super::SqliteStore;

/// One pushed value of a live-read subscription: every document currently
/// under a collection, keyed by id.
pub type Snapshot = BTreeMap<String, serde_json::Value>;

impl SqliteStore {
    /// Read the full current snapshot of a collection.
    ///
    /// Absence of data yields an empty snapshot, not an error.
    pub async fn snapshot(&self, collection: &str) -> Result<Snapshot, AppError> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = Snapshot::new();
        for row in rows {
            let id: String = row.get("id");
            let data: String = row.get("data");
            match serde_json::from_str(&data) {
                Ok(value) => {
                    snapshot.insert(id, value);
                }
                Err(err) => {
                    tracing::warn!(collection, id = %id, "Skipping unparseable document: {}", err);
                }
            }
        }
        Ok(snapshot)
    }

    /// Open a live-read subscription on a collection.
    ///
    /// The receiver holds the current snapshot and is sent the whole
    /// snapshot again after every mutation under the collection.
    pub async fn subscribe(&self, collection: &str) -> Result<watch::Receiver<Snapshot>, AppError> {
        let snapshot = self.snapshot(collection).await?;
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| AppError::Internal("Subscription registry poisoned".to_string()))?;
        let sender = channels
            .entry(collection.to_string())
            .or_insert_with(|| watch::channel(snapshot).0);
        Ok(sender.subscribe())
    }

    /// Write a document at a store-generated id and return that id.
    ///
    /// Object payloads get the generated id stamped into their `id` field
    /// so every stored record carries its own key.
    pub async fn push(
        &self,
        collection: &str,
        mut value: serde_json::Value,
    ) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        if let Some(object) = value.as_object_mut() {
            object.insert("id".to_string(), id.clone().into());
        }
        self.write(collection, &id, value).await?;
        Ok(id)
    }

    /// Full overwrite of a document.
    pub async fn write(
        &self,
        collection: &str,
        id: &str,
        value: serde_json::Value,
    ) -> Result<(), AppError> {
        let data = serde_json::to_string(&value)?;
        sqlx::query("INSERT OR REPLACE INTO documents (collection, id, data) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(id)
            .bind(&data)
            .execute(&self.pool)
            .await?;

        self.publish(collection).await
    }

    /// Partial update: merge top-level fields into a document, leaving the
    /// rest untouched. Creates the document when absent.
    pub async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<(), AppError> {
        let fields = match fields {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(AppError::Internal(format!(
                    "Partial update requires an object payload, got {}",
                    other
                )))
            }
        };

        let row = sqlx::query("SELECT data FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let mut document = match row {
            Some(row) => {
                let data: String = row.get("data");
                serde_json::from_str::<serde_json::Value>(&data)?
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            }
            None => serde_json::Map::new(),
        };

        for (key, value) in fields {
            document.insert(key, value);
        }
        document
            .entry("id".to_string())
            .or_insert_with(|| id.to_string().into());

        self.write(collection, id, serde_json::Value::Object(document))
            .await
    }

    /// Remove a document. Removing an absent document is a no-op.
    pub async fn remove(&self, collection: &str, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.publish(collection).await
    }

    /// Re-read and re-publish the full snapshot to any live subscribers.
    async fn publish(&self, collection: &str) -> Result<(), AppError> {
        let subscribed = self
            .channels
            .lock()
            .map_err(|_| AppError::Internal("Subscription registry poisoned".to_string()))?
            .contains_key(collection);
        if !subscribed {
            return Ok(());
        }

        let snapshot = self.snapshot(collection).await?;
        if let Ok(channels) = self.channels.lock() {
            if let Some(sender) = channels.get(collection) {
                sender.send_replace(snapshot);
            }
        }
        Ok(())
    }
}

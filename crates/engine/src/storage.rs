//! Persistence boundary.
//!
//! The engine sees storage as a key-value store of whole-state snapshots:
//! `load` returns the last saved payload for a key (if any) and `save`
//! replaces it. There is no partial write and no rollback.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, sea_query::OnConflict};
use tokio::sync::Mutex;

use crate::{ResultEngine, snapshots};

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, key: &str) -> ResultEngine<Option<String>>;

    async fn save(&self, key: &str, snapshot: &str) -> ResultEngine<()>;
}

/// Volatile store, the state lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, snapshot: &str) -> ResultEngine<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), snapshot.to_string());
        Ok(())
    }
}

/// Store backed by the `snapshots` table.
///
/// The schema is created by `migration::Migrator`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    database: DatabaseConnection,
}

impl SqliteStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn load(&self, key: &str) -> ResultEngine<Option<String>> {
        let model = snapshots::Entity::find_by_id(key.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(|m| m.payload))
    }

    async fn save(&self, key: &str, snapshot: &str) -> ResultEngine<()> {
        let model = snapshots::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            payload: ActiveValue::Set(snapshot.to_string()),
            saved_at: ActiveValue::Set(Utc::now()),
        };
        snapshots::Entity::insert(model)
            .on_conflict(
                OnConflict::column(snapshots::Column::Key)
                    .update_columns([snapshots::Column::Payload, snapshots::Column::SavedAt])
                    .to_owned(),
            )
            .exec(&self.database)
            .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use libsql::{params, Builder, Connection, Database};
use std::sync::Arc;

use super::{RecordStore, ScanPage, StorageError, UserInfo, UserRecord};
use crate::services::user::Role;

/// Remote libsql-backed record store. The database handle is owned here and
/// handed in at construction; nothing in this module is process-global.
#[derive(Clone)]
pub struct TursoStore {
    db: Arc<Database>,
}

impl TursoStore {
    pub async fn connect(url: &str, token: &str) -> Result<Self, StorageError> {
        info!("Connecting to Turso...");
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await?;

        let store = Self { db: Arc::new(db) };
        store.migrate().await?;

        info!("Turso store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, info TEXT NOT NULL)",
            (),
        )
        .await?;
        Ok(())
    }

    fn connection(&self) -> Result<Connection, StorageError> {
        Ok(self.db.connect()?)
    }
}

fn decode_row(id: i64, blob: &str) -> Result<UserRecord, StorageError> {
    let info: UserInfo = serde_json::from_str(blob)?;
    Ok(UserRecord { id: id as u64, info })
}

#[async_trait]
impl RecordStore for TursoStore {
    async fn get(&self, id: u64) -> Result<Option<UserRecord>, StorageError> {
        let conn = self.connection()?;
        let mut rows = conn
            .query("SELECT info FROM users WHERE id = ?1 LIMIT 1", params![id as i64])
            .await?;

        if let Some(row) = rows.next().await? {
            let blob = row.get::<String>(0)?;
            return Ok(Some(decode_row(id as i64, &blob)?));
        }

        Ok(None)
    }

    async fn put(&self, record: &UserRecord) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let blob = serde_json::to_string(&record.info)?;
        conn.execute(
            "INSERT OR REPLACE INTO users (id, info) VALUES (?1, ?2)",
            params![record.id as i64, blob],
        )
        .await?;
        Ok(())
    }

    async fn update(&self, record: &UserRecord) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let blob = serde_json::to_string(&record.info)?;
        conn.execute(
            "UPDATE users SET info = ?2 WHERE id = ?1",
            params![record.id as i64, blob],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM users WHERE id = ?1", params![id as i64])
            .await?;
        Ok(())
    }

    async fn scan_by_role(
        &self,
        role: Role,
        start_after: Option<u64>,
        limit: usize,
    ) -> Result<ScanPage, StorageError> {
        let conn = self.connection()?;
        let cursor = start_after.unwrap_or(0) as i64;
        let mut rows = conn
            .query(
                "SELECT id, info FROM users \
                 WHERE json_extract(info, '$.role') = ?1 AND id > ?2 \
                 ORDER BY id LIMIT ?3",
                params![role.to_string(), cursor, limit as i64],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = row.get::<i64>(0)?;
            let blob = row.get::<String>(1)?;
            items.push(decode_row(id, &blob)?);
        }

        let next = if items.len() == limit {
            items.last().map(|record| record.id)
        } else {
            None
        };

        Ok(ScanPage { items, next })
    }
}

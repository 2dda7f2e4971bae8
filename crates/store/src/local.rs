use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use async_trait::async_trait;
use shared::{
    domain::{Machine, MachineDraft, MachineId},
    error::StoreError,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use crate::{
    defaults::{default_machines, STORAGE_KEY},
    MachineStore,
};

/// Local persistent store: a single SQLite key-value row under a fixed key
/// holds the whole machine list as one serialized JSON array.
#[derive(Clone)]
pub struct LocalStore {
    pool: Pool<Sqlite>,
}

impl LocalStore {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::unavailable(format!("invalid database url: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::unavailable(format!("cannot open database: {e}")))?;

        let store = Self { pool };
        store.ensure_blob_table().await?;
        Ok(store)
    }

    async fn ensure_blob_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_blobs (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::unavailable(format!("cannot prepare kv_blobs table: {e}")))?;
        Ok(())
    }

    async fn read_blob(&self) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_blobs WHERE key = ?")
            .bind(STORAGE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("cannot read machine blob: {e}")))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn write_machines(&self, machines: &[Machine]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(machines)
            .map_err(|e| StoreError::backend(format!("cannot serialize machine list: {e}")))?;
        sqlx::query(
            "INSERT INTO kv_blobs (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(STORAGE_KEY)
        .bind(blob)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("cannot write machine blob: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl MachineStore for LocalStore {
    async fn get_machines(&self) -> Result<Vec<Machine>, StoreError> {
        match self.read_blob().await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::backend(format!("corrupt machine blob: {e}"))),
            None => {
                let seeded = default_machines();
                tracing::info!(count = seeded.len(), "seeding empty local store");
                self.write_machines(&seeded).await?;
                Ok(seeded)
            }
        }
    }

    async fn create_machine(&self, draft: MachineDraft) -> Result<Machine, StoreError> {
        let mut machines = self.get_machines().await?;
        let machine = draft.into_machine(MachineId::fresh());
        machines.push(machine.clone());
        self.write_machines(&machines).await?;
        Ok(machine)
    }

    async fn update_machine(&self, machine: Machine) -> Result<Machine, StoreError> {
        let mut machines = self.get_machines().await?;
        for slot in machines.iter_mut() {
            if slot.id == machine.id {
                *slot = machine.clone();
            }
        }
        self.write_machines(&machines).await?;
        Ok(machine)
    }

    async fn delete_machine(&self, id: MachineId) -> Result<MachineId, StoreError> {
        let mut machines = self.get_machines().await?;
        machines.retain(|m| m.id != id);
        self.write_machines(&machines).await?;
        Ok(id)
    }

    async fn save_all_machines(&self, machines: Vec<Machine>) -> Result<Vec<Machine>, StoreError> {
        self.write_machines(&machines).await?;
        Ok(machines)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<(), StoreError> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).map_err(|e| {
        StoreError::unavailable(format!(
            "failed to create parent directory '{}' for database url '{database_url}': {e}",
            parent.display()
        ))
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod tests;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::Database;

fn read_entry(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM cache_entries WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read cache entry {key}"))
}

fn write_entry(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO cache_entries (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("failed to write cache entry {key}"))?;
    Ok(())
}

impl Database {
    /// Raw value stored under `key`, if any.
    pub async fn get_cache_entry(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| read_entry(conn, &key)).await
    }

    /// Replace the value stored under `key`.
    pub async fn put_cache_entry(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| write_entry(conn, &key, &value)).await
    }

    /// Read-modify-write of a single entry inside one transaction.
    ///
    /// `update` receives the current value and returns the value to store
    /// (`None` leaves the entry untouched) plus a result for the caller.
    pub async fn update_cache_entry<F, T>(&self, key: &str, update: F) -> Result<T>
    where
        F: FnOnce(Option<String>) -> Result<(Option<String>, T)> + Send + 'static,
        T: Send + 'static,
    {
        let key = key.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open cache transaction")?;

            let current = read_entry(&tx, &key)?;
            let (next, output) = update(current)?;
            if let Some(value) = next {
                write_entry(&tx, &key, &value)?;
            }

            tx.commit().context("failed to commit cache transaction")?;
            Ok(output)
        })
        .await
    }
}

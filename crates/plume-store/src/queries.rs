use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Store;
use crate::models::EntryRow;

impl Store {
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| Ok(query_entry(conn, key)?.map(|row| row.value)))
    }

    pub fn entry(&self, key: &str) -> Result<Option<EntryRow>> {
        self.with_conn(|conn| query_entry(conn, key))
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                (key, value),
            )?;
            Ok(())
        })
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    /// Write several entries in one transaction so readers never observe a
    /// half-written group.
    pub fn put_many(&self, entries: &[(&str, String)]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for (key, value) in entries {
                tx.execute(
                    "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    (key, value),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn delete_many(&self, keys: &[&str]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for key in keys {
                tx.execute("DELETE FROM entries WHERE key = ?1", [key])?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Corrupt JSON in store entry '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.put(key, &raw)
    }
}

fn query_entry(conn: &Connection, key: &str) -> Result<Option<EntryRow>> {
    let row = conn
        .query_row(
            "SELECT key, value, updated_at FROM entries WHERE key = ?1",
            [key],
            |row| {
                Ok(EntryRow {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

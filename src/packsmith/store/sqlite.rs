use super::{KeyValueStore, StoreBackend};
use crate::error::{PackError, Result};
use rusqlite::{params, Connection};
use std::fs;
use std::io;
use std::path::Path;

pub const STORE_FILE: &str = "entries.sqlite3";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS entries (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
) WITHOUT ROWID;";

/// Production backend: one SQLite file per pack directory.
///
/// Keys use the default BINARY collation, so iteration order matches the
/// bytewise ordering of a LevelDB pack.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBackend;

pub struct SqliteStore {
    conn: Connection,
}

impl KeyValueStore for SqliteStore {
    fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM entries ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Inserts every entry inside one transaction.
    fn put_all(&mut self, entries: &[(String, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO entries (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn sample_keys(&self, limit: usize) -> Result<Vec<String>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM entries ORDER BY key LIMIT ?1")?;
        let rows = stmt.query_map([limit], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

impl StoreBackend for SqliteBackend {
    type Store = SqliteStore;

    fn open(&self, pack_dir: &Path) -> Result<SqliteStore> {
        fs::create_dir_all(pack_dir).map_err(PackError::Io)?;
        let path = pack_dir.join(STORE_FILE);
        log::debug!("Opening key-value store {}", path.display());

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    fn exists(&self, pack_dir: &Path) -> bool {
        pack_dir.join(STORE_FILE).is_file()
    }

    fn destroy(&self, pack_dir: &Path) -> Result<()> {
        match fs::remove_dir_all(pack_dir) {
            Ok(()) => {
                log::info!("Deleted pack folder: {}", pack_dir.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PackError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_iterate_in_key_order() {
        let dir = TempDir::new().unwrap();
        let pack_dir = dir.path().join("items");
        let mut store = SqliteBackend.open(&pack_dir).unwrap();

        store.put("!items!b", "{\"name\":\"B\"}").unwrap();
        store.put("!items!a", "{\"name\":\"A\"}").unwrap();
        store.put("!items!B", "{}").unwrap();

        let keys: Vec<_> = store.entries().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["!items!B", "!items!a", "!items!b"]);
        assert_eq!(store.sample_keys(2).unwrap(), vec!["!items!B", "!items!a"]);
        assert!(pack_dir.join(STORE_FILE).exists());
    }

    #[test]
    fn test_put_replaces_and_persists() {
        let dir = TempDir::new().unwrap();
        let pack_dir = dir.path().join("actors");
        {
            let mut store = SqliteBackend.open(&pack_dir).unwrap();
            store
                .put_all(&[
                    ("!actors!a".to_string(), "1".to_string()),
                    ("!actors!a".to_string(), "2".to_string()),
                ])
                .unwrap();
        }

        let reopened = SqliteBackend.open(&pack_dir).unwrap();
        assert_eq!(
            reopened.entries().unwrap(),
            vec![("!actors!a".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let pack_dir = dir.path().join("scenes");
        assert!(!SqliteBackend.exists(&pack_dir));
        SqliteBackend.open(&pack_dir).unwrap();
        assert!(SqliteBackend.exists(&pack_dir));

        SqliteBackend.destroy(&pack_dir).unwrap();
        assert!(!pack_dir.exists());
        SqliteBackend.destroy(&pack_dir).unwrap();
    }
}

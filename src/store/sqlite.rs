use super::CollageEntity;
use crate::{Error, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Schema version this build writes; stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// The collage archive database.
///
/// Holds one `collages` table keyed by id with a secondary index on
/// `created_at`. Every operation runs in its own transaction.
pub struct CollageStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl CollageStore {
    /// Open (or create) the archive at `path`, running migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StorageUnavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::StorageUnavailable(format!("{}: {}", path.display(), e)))?;
        log::debug!("opened collage archive at {}", path.display());
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// A private in-memory archive, gone when dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        let mut store = CollageStore { conn, db_path };
        store.migrate()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Bring the schema up to `SCHEMA_VERSION`. Safe to run on every open.
    fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        let version: i64 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version > SCHEMA_VERSION {
            return Err(Error::StorageUnavailable(format!(
                "archive schema v{} is newer than supported v{}",
                version, SCHEMA_VERSION
            )));
        }

        if version < 1 {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS collages (
                    id          TEXT PRIMARY KEY NOT NULL,
                    image       TEXT NOT NULL,
                    created_at  INTEGER NOT NULL
                )",
                [],
            )?;
            tx.execute(
                "CREATE INDEX IF NOT EXISTS idx_collages_created_at
                 ON collages(created_at)",
                [],
            )?;
            log::info!("collage archive schema upgraded from v{} to v1", version);
        }

        // New migrations go here as `if version < N { ... }`

        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    /// Insert or replace by id.
    pub fn put(&mut self, entity: &CollageEntity) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO collages (id, image, created_at) VALUES (?1, ?2, ?3)",
            params![entity.id, entity.image, entity.created_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Every stored collage, in storage order.
    pub fn get_all(&mut self) -> Result<Vec<CollageEntity>> {
        let tx = self.conn.transaction()?;
        let collages = {
            let mut stmt = tx.prepare("SELECT id, image, created_at FROM collages")?;
            let rows = stmt.query_map([], |row| {
                Ok(CollageEntity {
                    id: row.get(0)?,
                    image: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(collages)
    }

    /// Remove by id; absent ids are not an error.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM collages WHERE id = ?1", params![id])?;
        tx.commit()?;
        if removed == 0 {
            log::debug!("delete of unknown collage {} ignored", id);
        }
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM collages", [], |row| row.get(0))?)
    }
}

impl std::fmt::Debug for CollageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollageStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, created_at: i64) -> CollageEntity {
        CollageEntity {
            id: id.to_string(),
            image: "data:image/png;base64,AA==".to_string(),
            created_at,
        }
    }

    #[test]
    fn put_get_delete() {
        let mut store = CollageStore::open_in_memory().unwrap();
        store.put(&entity("a", 1)).unwrap();
        store.put(&entity("b", 2)).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|e| e.id == "a"));

        store.delete("a").unwrap();
        store.delete("missing").unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all, vec![entity("b", 2)]);
    }

    #[test]
    fn put_replaces_by_id() {
        let mut store = CollageStore::open_in_memory().unwrap();
        store.put(&entity("a", 1)).unwrap();
        store.put(&entity("a", 5)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get_all().unwrap()[0].created_at, 5);
    }

    #[test]
    fn schema_init_is_idempotent_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("collage-db.sqlite3");
        {
            let mut store = CollageStore::open(&path).unwrap();
            store.put(&entity("keep", 7)).unwrap();
            assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        }
        let mut store = CollageStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(store.get_all().unwrap(), vec![entity("keep", 7)]);

        let indexes: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_collages_created_at'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 1);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", 9).unwrap();
        }
        assert!(matches!(CollageStore::open(&path), Err(Error::StorageUnavailable(_))));
    }
}

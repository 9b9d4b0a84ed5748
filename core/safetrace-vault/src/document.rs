//! Document persistence for vault items.
//!
//! Each item is stored as one JSON document keyed by its id. Every
//! operation touches exactly one document in a single statement, so a
//! reader never sees a half-written item.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use duckdb::{Connection, params};
use safetrace_types::ItemId;
use tracing::{debug, warn};

use crate::error::{VaultError, VaultResult};
use crate::model::VaultItem;

/// Default on-disk location used when no store URL is configured.
pub const DEFAULT_STORE_PATH: &str = "safetrace-vault.duckdb";

/// Turns the stored item into its replacement.
pub type ItemUpdate<'a> = Box<dyn FnOnce(&VaultItem) -> VaultResult<VaultItem> + 'a>;

/// Blocking single-document persistence.
///
/// Implementations must be safe to call from many threads at once.
pub trait DocumentStore: Send + Sync {
    /// All items of one owner, oldest first.
    fn find_by_owner(&self, owner_id: &str) -> VaultResult<Vec<VaultItem>>;

    fn get(&self, id: &ItemId) -> VaultResult<Option<VaultItem>>;

    fn insert(&self, item: &VaultItem) -> VaultResult<()>;

    /// Overwrites the stored document. Returns `false` if no document has
    /// this item's id.
    fn replace(&self, item: &VaultItem) -> VaultResult<bool>;

    /// Reads the item, passes it to `apply` and writes the result back as
    /// one step. No other write to the store lands between the read and the
    /// write. Fails with [`VaultError::NotFound`] if the item is absent.
    fn update_with(&self, id: &ItemId, apply: ItemUpdate<'_>) -> VaultResult<VaultItem>;

    /// Returns `false` if nothing was deleted.
    fn delete(&self, id: &ItemId) -> VaultResult<bool>;
}

/// Open a DuckDB connection with stale WAL recovery.
///
/// If the initial open fails and a `.wal` file exists alongside the database,
/// it is removed and the open is retried once.
pub fn open_duckdb_with_wal_recovery(path: &Path) -> VaultResult<Connection> {
    match Connection::open(path) {
        Ok(conn) => Ok(conn),
        Err(first_err) => {
            let wal_path = path.with_extension(
                path.extension()
                    .map(|ext| format!("{}.wal", ext.to_string_lossy()))
                    .unwrap_or_else(|| "wal".to_string()),
            );
            if wal_path.exists() {
                warn!(
                    wal = %wal_path.display(),
                    "DuckDB open failed, removing stale WAL and retrying"
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    return Connection::open(path).map_err(Into::into);
                }
            }
            Err(first_err.into())
        }
    }
}

/// [`DocumentStore`] backed by a single shared DuckDB connection.
#[derive(Clone)]
pub struct DuckDbDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbDocumentStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> VaultResult<Self> {
        let conn = open_duckdb_with_wal_recovery(path.as_ref())?;
        Self::open_with_conn(Arc::new(Mutex::new(conn)))
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> VaultResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::open_with_conn(Arc::new(Mutex::new(conn)))
    }

    /// Opens a store on an existing connection.
    pub fn open_with_conn(conn: Arc<Mutex<Connection>>) -> VaultResult<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens a store from a connection string.
    ///
    /// Accepts `:memory:`, `duckdb://<path>`, or a bare file path. An
    /// empty string selects [`DEFAULT_STORE_PATH`].
    pub fn open_url(url: &str) -> VaultResult<Self> {
        let target = url.strip_prefix("duckdb://").unwrap_or(url).trim();
        match target {
            ":memory:" => Self::open_in_memory(),
            "" => Self::open(DEFAULT_STORE_PATH),
            path => Self::open(path),
        }
    }

    fn lock(&self) -> VaultResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Store("connection lock poisoned".to_string()))
    }

    fn init_schema(&self) -> VaultResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS vault_items (
                id VARCHAR PRIMARY KEY,
                owner_id VARCHAR NOT NULL,
                document VARCHAR NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

impl DocumentStore for DuckDbDocumentStore {
    fn find_by_owner(&self, owner_id: &str) -> VaultResult<Vec<VaultItem>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT document FROM vault_items WHERE owner_id = ? ORDER BY id")?;
        let rows = stmt.query_map(params![owner_id], |row| row.get::<_, String>(0))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(serde_json::from_str(&row?)?);
        }
        debug!(owner_id, count = items.len(), "listed vault items");
        Ok(items)
    }

    fn get(&self, id: &ItemId) -> VaultResult<Option<VaultItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT document FROM vault_items WHERE id = ?")?;
        let mut rows = stmt.query_map(params![id.to_string()], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(doc) => Ok(Some(serde_json::from_str(&doc?)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, item: &VaultItem) -> VaultResult<()> {
        let document = serde_json::to_string(item)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO vault_items (id, owner_id, document) VALUES (?, ?, ?)",
            params![item.id.to_string(), item.owner_id, document],
        )?;
        Ok(())
    }

    fn replace(&self, item: &VaultItem) -> VaultResult<bool> {
        let document = serde_json::to_string(item)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE vault_items SET document = ? WHERE id = ?",
            params![document, item.id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn update_with(&self, id: &ItemId, apply: ItemUpdate<'_>) -> VaultResult<VaultItem> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let stored = {
            let mut stmt = tx.prepare("SELECT document FROM vault_items WHERE id = ?")?;
            let mut rows =
                stmt.query_map(params![id.to_string()], |row| row.get::<_, String>(0))?;
            rows.next().transpose()?
        };
        let current: VaultItem = match stored {
            Some(doc) => serde_json::from_str(&doc)?,
            None => return Err(VaultError::NotFound(*id)),
        };

        let next = apply(&current)?;
        tx.execute(
            "UPDATE vault_items SET document = ? WHERE id = ?",
            params![serde_json::to_string(&next)?, id.to_string()],
        )?;
        tx.commit()?;
        Ok(next)
    }

    fn delete(&self, id: &ItemId) -> VaultResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM vault_items WHERE id = ?",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

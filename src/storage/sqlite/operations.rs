use anyhow::{anyhow, Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Duration;

use super::schema::SCHEMA_SQL;
use crate::text::initials;

/// SQL function returning the initials of a name's significant words.
pub(crate) const INITIALS_FN: &str = "name_initials";

/// A fixed set of catalog connections, opened once and reused for the process lifetime.
pub struct SqliteCatalog {
    pool: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl SqliteCatalog {
    /// Open `pool_size` read-only connections to an existing catalog database.
    pub fn open(db_path: &Path, pool_size: usize) -> Result<Self> {
        if !db_path.exists() {
            return Err(anyhow!("Catalog database not found: {}", db_path.display()));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;

        let mut pool = Vec::with_capacity(pool_size.max(1));
        for _ in 0..pool_size.max(1) {
            let conn = Connection::open_with_flags(db_path, flags)
                .with_context(|| format!("Failed to open catalog db: {}", db_path.display()))?;
            conn.busy_timeout(Duration::from_secs(5))
                .context("Failed to set busy timeout")?;
            register_functions(&conn)?;
            pool.push(Mutex::new(conn));
        }

        tracing::info!(
            path = %db_path.display(),
            connections = pool.len(),
            "Opened catalog"
        );

        Ok(Self {
            pool,
            next: AtomicUsize::new(0),
        })
    }

    /// Create (or open) a writable catalog file and ensure the schema exists.
    /// Used by fixtures and by ingestion tooling; the engine itself opens read-only.
    pub fn create(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create db parent dir: {}", parent.display()))?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open catalog db: {}", db_path.display()))?;
        let catalog = Self::from_connection(conn)?;
        catalog.init_schema()?;
        Ok(catalog)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        Ok(Self {
            pool: vec![Mutex::new(conn)],
            next: AtomicUsize::new(0),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory catalog")?;
        let catalog = Self::from_connection(conn)?;
        catalog.init_schema()?;
        Ok(catalog)
    }

    pub fn init_schema(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(SCHEMA_SQL)
                .context("Failed to initialize catalog schema")
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Run `f` on a free pooled connection, waiting on one if all are busy.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.acquire();
        f(&guard)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        let len = self.pool.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;
        for offset in 0..len {
            match self.pool[(start + offset) % len].try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            }
        }
        self.pool[start]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        INITIALS_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let name: Option<String> = ctx.get(0)?;
            Ok(name.as_deref().map(initials).unwrap_or_default())
        },
    )
    .with_context(|| format!("Failed to register {INITIALS_FN}"))
}

// Key-value persistence media for the todo collection

use crate::error::MediumError;
use crate::models::now_ms;
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// String key-value storage that survives process restarts
///
/// Writers pointed at the same key in different processes are not
/// coordinated: the last `save` wins.
pub trait Medium {
    /// Stored value for `key`, or `None` if it was never saved
    fn load(&self, key: &str) -> Result<Option<String>, MediumError>;

    /// Replace the value for `key`
    fn save(&mut self, key: &str, value: &str) -> Result<(), MediumError>;
}

impl<M: Medium + ?Sized> Medium for Box<M> {
    fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        (**self).save(key, value)
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local medium, mainly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryMedium {
    values: HashMap<String, String>,
    fail_saves: bool,
    save_count: usize,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Medium pre-seeded with one stored value
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut medium = Self::default();
        medium.values.insert(key.to_string(), value.to_string());
        medium
    }

    /// Make every subsequent `save` fail with [`MediumError::Unavailable`]
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl Medium for MemoryMedium {
    fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        if self.fail_saves {
            return Err(MediumError::Unavailable(format!("saves disabled for {}", key)));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.save_count += 1;
        Ok(())
    }
}

// ============================================================================
// JSON files
// ============================================================================

/// One `{key}.json` file per key under a base directory
#[derive(Debug, Clone)]
pub struct FileMedium {
    base_path: PathBuf,
}

impl FileMedium {
    /// Open or create a file medium rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MediumError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl Medium for FileMedium {
    fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        let path = self.value_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Undecodable bytes are a corrupt value, not an unreadable medium
        match String::from_utf8(bytes) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) => {
                warn!(?path, error = %e.utf8_error(), "Value file is not valid UTF-8");
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        let path = self.value_path(key);
        let lock_path = self.base_path.join(format!("{}.lock", key));
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        // Serializes writers across processes; released when `lock` is dropped
        lock.lock_exclusive().map_err(|source| MediumError::Lock {
            path: lock_path.clone(),
            source,
        })?;

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)?;

        debug!(?path, bytes = value.len(), "Wrote value file");
        Ok(())
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// A single `kv` table in a SQLite database
pub struct SqliteMedium {
    db: Connection,
}

impl SqliteMedium {
    /// Open or create the database at `path`, creating parent directories as needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MediumError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;
        Self::init(db)
    }

    pub fn open_in_memory() -> Result<Self, MediumError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<Self, MediumError> {
        debug!("Creating kv schema");

        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(Self { db })
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }
}

impl Medium for SqliteMedium {
    fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        self.db.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now_ms()],
        )?;
        Ok(())
    }
}

use serde::{Serialize, Deserialize};
use async_trait::async_trait;
use std::collections::HashMap;

/// What the profile store knows about a returning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id:       String,
    pub registered_at: chrono::DateTime<chrono::Utc>,
    /// Free-form, store-defined data.
    #[serde(default)]
    pub data:          serde_json::Map<String, serde_json::Value>,
}

impl Profile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id:       user_id.into(),
            registered_at: chrono::Utc::now(),
            data:          serde_json::Map::new(),
        }
    }
}

/// Persistent per-user store consulted before a session's context is
/// initialised.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a user. `Ok(None)` means the user has never been seen.
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, String>;

    /// Record a user so later sessions see them as returning.
    async fn register(&self, user_id: &str) -> Result<(), String>;
}

/// A simple in-memory store for testing and short-lived processes.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: std::sync::Mutex<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, String> {
        let store = self.profiles.lock().map_err(|e| e.to_string())?;
        Ok(store.get(user_id).cloned())
    }

    async fn register(&self, user_id: &str) -> Result<(), String> {
        let mut store = self.profiles.lock().map_err(|e| e.to_string())?;
        store.entry(user_id.to_string())
            .or_insert_with(|| Profile::new(user_id));
        Ok(())
    }
}

/// A profile store backed by a SQLite database.
#[cfg(feature = "sqlite")]
pub struct SqliteProfileStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "sqlite")]
impl SqliteProfileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let conn = rusqlite::Connection::open(&path).map_err(|e| e.to_string())?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                user_id       TEXT PRIMARY KEY,
                registered_at TEXT NOT NULL,
                data          TEXT NOT NULL
            )",
            [],
        ).map_err(|e| e.to_string())?;
        Ok(Self { path })
    }

    fn get_conn(&self) -> Result<rusqlite::Connection, String> {
        rusqlite::Connection::open(&self.path).map_err(|e| e.to_string())
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, registered_at, data FROM profiles WHERE user_id = ?1"
        ).map_err(|e| e.to_string())?;

        let mut rows = stmt.query(rusqlite::params![user_id]).map_err(|e| e.to_string())?;
        let Some(row) = rows.next().map_err(|e| e.to_string())? else {
            return Ok(None);
        };
        let registered_at: String = row.get(1).map_err(|e| e.to_string())?;
        let data: String = row.get(2).map_err(|e| e.to_string())?;

        Ok(Some(Profile {
            user_id:       row.get(0).map_err(|e| e.to_string())?,
            registered_at: chrono::DateTime::parse_from_rfc3339(&registered_at)
                               .map_err(|e| e.to_string())?.with_timezone(&chrono::Utc),
            data:          serde_json::from_str(&data).map_err(|e| e.to_string())?,
        }))
    }

    async fn register(&self, user_id: &str) -> Result<(), String> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO profiles (user_id, registered_at, data)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![user_id, chrono::Utc::now().to_rfc3339(), "{}"],
        ).map_err(|e| e.to_string())?;
        Ok(())
    }
}

//! Small key-value preference storage with expiry.
//!
//! Remembers the last wallet, account and token between sessions. Entries
//! carry a time-to-live; expired entries read as absent.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::Network;

pub const WALLET_ADDRESS_KEY: &str = "wallet_address";
pub const WALLET_NAME_KEY: &str = "wallet_name";
pub const TOKEN_SYMBOL_KEY: &str = "token_symbol";

/// Thirty days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[cfg(feature = "persistence")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expiry out of range: {0:?}")]
    Ttl(Duration),
}

fn expiry(ttl: Duration) -> Result<DateTime<Utc>, PreferenceError> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or(PreferenceError::Ttl(ttl))
}

/// Storage port for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), PreferenceError>;
    fn delete(&mut self, key: &str) -> Result<(), PreferenceError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), PreferenceError> {
        (**self).set(key, value, ttl)
    }

    fn delete(&mut self, key: &str) -> Result<(), PreferenceError> {
        (**self).delete(key)
    }
}

/// Process-local store, used in tests and when no data directory exists.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: HashMap<String, (String, DateTime<Utc>)>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self
            .entries
            .get(key)
            .filter(|(_, expires_at)| Utc::now() < *expires_at)
            .map(|(value, _)| value.clone()))
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), PreferenceError> {
        let expires_at = expiry(ttl)?;
        self.entries
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), PreferenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(feature = "persistence")]
pub use sqlite::SqlitePreferenceStore;

#[cfg(feature = "persistence")]
mod sqlite {
    use super::*;
    use rusqlite::{Connection, OptionalExtension, params};
    use std::path::Path;

    /// SQLite-backed store.
    pub struct SqlitePreferenceStore {
        conn: Connection,
    }

    impl SqlitePreferenceStore {
        /// Open or create the database at the given path.
        pub fn open(path: &Path) -> Result<Self, PreferenceError> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let conn = Connection::open(path)?;
            let store = Self { conn };
            store.init_schema()?;
            Ok(store)
        }

        /// Open an in-memory database (for testing).
        pub fn open_memory() -> Result<Self, PreferenceError> {
            let conn = Connection::open_in_memory()?;
            let store = Self { conn };
            store.init_schema()?;
            Ok(store)
        }

        fn init_schema(&self) -> Result<(), PreferenceError> {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS preferences (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    expires_at INTEGER NOT NULL
                );
                "#,
            )?;
            Ok(())
        }

        /// Delete every expired entry. Returns the number removed.
        pub fn purge_expired(&self) -> Result<usize, PreferenceError> {
            let removed = self.conn.execute(
                "DELETE FROM preferences WHERE expires_at <= ?1",
                params![Utc::now().timestamp_millis()],
            )?;
            Ok(removed)
        }
    }

    impl PreferenceStore for SqlitePreferenceStore {
        fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
            let row: Option<(String, i64)> = self
                .conn
                .query_row(
                    "SELECT value, expires_at FROM preferences WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            Ok(row.and_then(|(value, expires_at)| {
                (Utc::now().timestamp_millis() < expires_at).then_some(value)
            }))
        }

        fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), PreferenceError> {
            let expires_at = expiry(ttl)?;
            self.conn.execute(
                r#"
                INSERT OR REPLACE INTO preferences (key, value, expires_at)
                VALUES (?1, ?2, ?3)
                "#,
                params![key, value, expires_at.timestamp_millis()],
            )?;
            Ok(())
        }

        fn delete(&mut self, key: &str) -> Result<(), PreferenceError> {
            self.conn
                .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
            Ok(())
        }
    }
}

/// The last connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberedWallet {
    pub address: String,
    pub wallet_name: Option<String>,
}

/// Typed access to the known preference keys.
#[derive(Debug)]
pub struct Preferences<S> {
    store: S,
    ttl: Duration,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn remember_wallet(
        &mut self,
        address: &str,
        wallet_name: Option<&str>,
    ) -> Result<(), PreferenceError> {
        self.store.set(WALLET_ADDRESS_KEY, address, self.ttl)?;
        match wallet_name {
            Some(name) => self.store.set(WALLET_NAME_KEY, name, self.ttl),
            None => self.store.delete(WALLET_NAME_KEY),
        }
    }

    pub fn wallet(&self) -> Result<Option<RememberedWallet>, PreferenceError> {
        let Some(address) = self.store.get(WALLET_ADDRESS_KEY)? else {
            return Ok(None);
        };
        Ok(Some(RememberedWallet {
            address,
            wallet_name: self.store.get(WALLET_NAME_KEY)?,
        }))
    }

    pub fn forget_wallet(&mut self) -> Result<(), PreferenceError> {
        self.store.delete(WALLET_ADDRESS_KEY)?;
        self.store.delete(WALLET_NAME_KEY)
    }

    pub fn remember_network(&mut self, network: Network) -> Result<(), PreferenceError> {
        self.store
            .set(TOKEN_SYMBOL_KEY, network.token_symbol(), self.ttl)
    }

    /// The remembered network. Unknown token symbols are ignored.
    pub fn network(&self) -> Result<Option<Network>, PreferenceError> {
        Ok(self
            .store
            .get(TOKEN_SYMBOL_KEY)?
            .and_then(|symbol| Network::from_token_symbol(&symbol)))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store<S: PreferenceStore>(mut store: S) {
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1", DEFAULT_TTL).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));
        store.set("k", "v2", DEFAULT_TTL).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("gone", "x", Duration::ZERO).unwrap();
        assert_eq!(store.get("gone").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        exercise_store(MemoryPreferenceStore::new());
    }

    #[test]
    fn test_boxed_store() {
        let store: Box<dyn PreferenceStore> = Box::new(MemoryPreferenceStore::new());
        exercise_store(store);
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_store() {
        exercise_store(SqlitePreferenceStore::open_memory().unwrap());
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_purge_expired() {
        let mut store = SqlitePreferenceStore::open_memory().unwrap();
        store.set("old", "x", Duration::ZERO).unwrap();
        store.set("new", "y", DEFAULT_TTL).unwrap();
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.get("new").unwrap().as_deref(), Some("y"));
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_open_creates_parent() {
        let root = std::env::temp_dir().join(format!("unqstake-prefs-{}", std::process::id()));
        let path = root.join("nested").join("preferences.db");
        exercise_store(SqlitePreferenceStore::open(&path).unwrap());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_open_parent_is_file() {
        let blocker =
            std::env::temp_dir().join(format!("unqstake-prefs-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"").unwrap();
        let result = SqlitePreferenceStore::open(&blocker.join("preferences.db"));
        let _ = std::fs::remove_file(&blocker);
        assert!(matches!(result, Err(PreferenceError::Io(_))));
    }

    #[test]
    fn test_ttl_out_of_range() {
        let mut store = MemoryPreferenceStore::new();
        assert!(matches!(
            store.set("k", "v", Duration::MAX),
            Err(PreferenceError::Ttl(_))
        ));
    }

    #[test]
    fn test_preferences_wallet() {
        let mut prefs = Preferences::new(MemoryPreferenceStore::new());
        assert_eq!(prefs.wallet().unwrap(), None);

        prefs.remember_wallet("5Grw", Some("polkadot-js")).unwrap();
        assert_eq!(
            prefs.wallet().unwrap(),
            Some(RememberedWallet {
                address: "5Grw".to_string(),
                wallet_name: Some("polkadot-js".to_string()),
            })
        );

        prefs.remember_wallet("5Grw", None).unwrap();
        assert_eq!(prefs.wallet().unwrap().unwrap().wallet_name, None);

        prefs.forget_wallet().unwrap();
        assert_eq!(prefs.wallet().unwrap(), None);
    }

    #[test]
    fn test_preferences_network() {
        let mut prefs = Preferences::new(MemoryPreferenceStore::new());
        assert_eq!(prefs.network().unwrap(), None);
        prefs.remember_network(Network::Quartz).unwrap();
        assert_eq!(prefs.network().unwrap(), Some(Network::Quartz));
    }

    #[test]
    fn test_preferences_ignore_unknown_token() {
        let mut store = MemoryPreferenceStore::new();
        store.set(TOKEN_SYMBOL_KEY, "DOT", DEFAULT_TTL).unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.network().unwrap(), None);
    }

    #[test]
    fn test_preferences_expired_ttl() {
        let mut prefs = Preferences::new(MemoryPreferenceStore::new()).with_ttl(Duration::ZERO);
        prefs.remember_network(Network::Unique).unwrap();
        assert_eq!(prefs.network().unwrap(), None);
    }
}

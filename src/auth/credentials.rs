//! Signed-in credentials and their durable storage.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use derive_new::new;
use tracing::{debug, instrument, warn};

use crate::StorageError;

/// Storage key of the username.
pub const USERNAME_KEY: &str = "username";
/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the token expiry (unix seconds).
pub const TOKEN_EXPIRATION_KEY: &str = "tokenExpiration";
/// Storage key of the competition flag.
pub const IN_COMPETITION_KEY: &str = "inCompetition";

/// Credentials of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Bearer token.
    pub token: String,
    /// Expiry as unix seconds.
    pub token_expiration: i64,
    /// Whether the user joined the competition.
    #[new(default)]
    pub in_competition: bool,
}

impl Credentials {
    /// Reconstructs credentials from storage.
    ///
    /// Absent when any required key is missing or unparsable, or when the
    /// token is not valid beyond `now` (unix seconds).
    #[instrument(skip(storage))]
    pub fn load(storage: &dyn CredentialStorage, now: i64) -> Option<Self> {
        let username = storage.get(USERNAME_KEY)?;
        let token = storage.get(TOKEN_KEY)?;
        let token_expiration = match storage.get(TOKEN_EXPIRATION_KEY)?.parse::<i64>() {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Stored token expiration is not a number");
                return None;
            }
        };
        if username.is_empty() || token.is_empty() {
            return None;
        }
        if token_expiration <= now {
            debug!(token_expiration, now, "Stored token has expired");
            return None;
        }
        let in_competition = storage
            .get(IN_COMPETITION_KEY)
            .is_some_and(|v| v == "true");
        Some(Self {
            username,
            token,
            token_expiration,
            in_competition,
        })
    }

    /// Writes all keys to storage.
    #[instrument(skip(self, storage), fields(username = %self.username))]
    pub fn store(&self, storage: &dyn CredentialStorage) -> Result<(), StorageError> {
        storage.set(USERNAME_KEY, &self.username)?;
        storage.set(TOKEN_KEY, &self.token)?;
        storage.set(TOKEN_EXPIRATION_KEY, &self.token_expiration.to_string())?;
        storage.set(IN_COMPETITION_KEY, &self.in_competition.to_string())
    }

    /// Removes all keys from storage.
    #[instrument(skip(storage))]
    pub fn clear(storage: &dyn CredentialStorage) -> Result<(), StorageError> {
        for key in [USERNAME_KEY, TOKEN_KEY, TOKEN_EXPIRATION_KEY, IN_COMPETITION_KEY] {
            storage.remove(key)?;
        }
        Ok(())
    }
}

/// Durable key/value storage for credentials.
pub trait CredentialStorage: Send + Sync + std::fmt::Debug {
    /// Reads a key.
    fn get(&self, key: &str) -> Option<String>;
    /// Writes a key.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Deletes a key; deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Storage persisted to a TOML file, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens `path`, starting empty if the file does not exist yet.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            debug!("Storage file missing, starting empty");
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        change(&mut entries);
        let content = toml::to_string(&*entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_storage() {
        let storage = MemoryStorage::new();
        let creds = Credentials::new("alice".into(), "tok".into(), 2_000);
        creds.store(&storage).unwrap();
        assert_eq!(Credentials::load(&storage, 1_000), Some(creds));
    }

    #[test]
    fn test_expired_token_is_absent() {
        let storage = MemoryStorage::new();
        Credentials::new("alice".into(), "tok".into(), 1_000)
            .store(&storage)
            .unwrap();
        assert_eq!(Credentials::load(&storage, 1_000), None);
        assert_eq!(Credentials::load(&storage, 5_000), None);
    }

    #[test]
    fn test_missing_field_is_absent() {
        let storage = MemoryStorage::new();
        storage.set(USERNAME_KEY, "alice").unwrap();
        storage.set(TOKEN_EXPIRATION_KEY, "9999999999").unwrap();
        assert_eq!(Credentials::load(&storage, 0), None);
    }

    #[test]
    fn test_clear_removes_everything() {
        let storage = MemoryStorage::new();
        Credentials::new("alice".into(), "tok".into(), 2_000)
            .store(&storage)
            .unwrap();
        Credentials::clear(&storage).unwrap();
        assert_eq!(storage.get(USERNAME_KEY), None);
        assert_eq!(storage.get(IN_COMPETITION_KEY), None);
    }
}

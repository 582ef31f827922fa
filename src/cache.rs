//! Token cache for the resource allocator client.
//!
//! The cache is a single JSON file holding the session token issued by the
//! server, keyed by server address and user email. A missing, unreadable or
//! stale cache file is simply treated as "no cached token"; the only fatal
//! failures are write errors.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A cached session token together with the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedToken {
    pub server: String,
    pub email: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Build a cache entry from a login response, defaulting the expiry to
    /// one hour from now when the server does not report one.
    pub fn from_login(settings: &Settings, token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            server: settings.server_str().to_string(),
            email: settings.email.clone(),
            token,
            expires_at: expires_at.or_else(|| Some(Utc::now() + Duration::hours(1))),
        }
    }

    fn is_valid_for(&self, settings: &Settings) -> bool {
        if self.server != settings.server_str() || self.email != settings.email {
            debug!("Cached token belongs to a different server or user");
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at <= Utc::now() {
                debug!("Cached token expired at {}", expires_at);
                return false;
            }
        }

        true
    }
}

/// File-backed store for the session token.
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached token, if one exists and is still usable.
    ///
    /// Any read or parse failure yields `None`; a corrupt cache file must
    /// never prevent a fresh login.
    pub fn load(&self, settings: &Settings) -> Option<CachedToken> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No cached token at {}: {}", self.path.display(), e);
                return None;
            }
        };

        let entry: CachedToken = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Could not parse token cache: {}", e);
                return None;
            }
        };

        if entry.is_valid_for(settings) {
            Some(entry)
        } else {
            None
        }
    }

    /// Write a cache entry, creating parent directories as needed.
    ///
    /// The token is a bearer secret, so the file is made owner-readable
    /// only on Unix.
    pub fn store(&self, entry: &CachedToken) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(entry)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("Stored session token in {}", self.path.display());
        Ok(())
    }

    /// Remove the cache file so the next invocation performs a fresh login.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_settings() -> Settings {
        Settings::new(
            "http://localhost:8000",
            "user@example.com",
            10,
            Some(PathBuf::from("unused")),
        )
        .unwrap()
    }

    fn cache_in(dir: &TempDir) -> TokenCache {
        TokenCache::new(dir.path().join("localhost_8000.json"))
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings();
        let cache = cache_in(&dir);

        let entry = CachedToken::from_login(&settings, "T".to_string(), None);
        cache.store(&entry).unwrap();

        let loaded = cache.load(&settings).unwrap();
        assert_eq!(loaded, entry);
        assert_eq!(loaded.token, "T");
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        assert!(cache.load(&test_settings()).is_none());
    }

    #[test]
    fn test_corrupt_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        fs::write(cache.path(), "not json at all").unwrap();
        assert!(cache.load(&test_settings()).is_none());
    }

    #[test]
    fn test_mismatched_identity_is_absent() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings();
        let cache = cache_in(&dir);

        let mut entry = CachedToken::from_login(&settings, "T".to_string(), None);
        entry.email = "other@example.com".to_string();
        cache.store(&entry).unwrap();

        assert!(cache.load(&settings).is_none());
    }

    #[test]
    fn test_expired_token_is_absent() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings();
        let cache = cache_in(&dir);

        let entry = CachedToken::from_login(
            &settings,
            "T".to_string(),
            Some(Utc::now() - Duration::minutes(5)),
        );
        cache.store(&entry).unwrap();

        assert!(cache.load(&settings).is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings();
        let cache = cache_in(&dir);

        cache.clear().unwrap();
        cache
            .store(&CachedToken::from_login(&settings, "T".to_string(), None))
            .unwrap();
        cache.clear().unwrap();
        assert!(cache.load(&settings).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let settings = test_settings();
        let cache = cache_in(&dir);
        cache
            .store(&CachedToken::from_login(&settings, "T".to_string(), None))
            .unwrap();

        let mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

//! Runtime settings for the resource allocator client.
//!
//! All configuration is explicit: the server address, user email, request
//! timeout and token-cache path are resolved once from the command line and
//! passed into each component at construction. There is no ambient state.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "resource_allocator_client";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid server address '{address}': {cause}")]
    InvalidServerAddress { address: String, cause: String },
    #[error("failed to resolve the cache directory")]
    FailedToFindCacheDirectory,
}

/// Resolved configuration for a single invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: Url,
    pub email: String,
    pub timeout: Duration,
    pub cache_path: PathBuf,
}

impl Settings {
    pub fn new(
        server: &str,
        email: &str,
        timeout_secs: u64,
        cache_path: Option<PathBuf>,
    ) -> Result<Self, SettingsError> {
        let server = normalize_server_address(server)?;
        let cache_path = match cache_path {
            Some(path) => path,
            None => Self::default_cache_path(&server)?,
        };
        debug!("Using token cache at {}", cache_path.display());

        Ok(Self {
            server,
            email: email.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            cache_path,
        })
    }

    /// Resolve the default cache file path for a server.
    ///
    /// When RESOURCE_ALLOCATOR_CACHE_DIR is set, that directory is used.
    /// Otherwise the system cache directory with an application subdirectory.
    pub fn default_cache_path(server: &Url) -> Result<PathBuf, SettingsError> {
        let cache_dir = if let Ok(dir) = std::env::var("RESOURCE_ALLOCATOR_CACHE_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::cache_dir()
                .ok_or(SettingsError::FailedToFindCacheDirectory)?
                .join(DEFAULT_APPLICATION_ID)
        };

        Ok(cache_dir.join(cache_file_name(server)))
    }

    /// The server address with any trailing slash removed, as sent in
    /// request URLs and recorded in the token cache.
    pub fn server_str(&self) -> &str {
        self.server.as_str().trim_end_matches('/')
    }
}

/// Normalize a server address: strip trailing slashes and promote bare
/// host names to https.
fn normalize_server_address(address: &str) -> Result<Url, SettingsError> {
    // The scheme check must look at the untrimmed input: trimming first
    // would reduce a degenerate "http://" to "http:" and promote it into
    // a well-formed but wrong https URL
    let has_scheme = address.contains("://");
    let trimmed = address.trim_end_matches('/');
    let with_scheme = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&with_scheme).map_err(|e| SettingsError::InvalidServerAddress {
        address: address.to_string(),
        cause: e.to_string(),
    })
}

/// One cache file per server host, so tokens for different deployments do
/// not clobber each other.
fn cache_file_name(server: &Url) -> String {
    let host = server.host_str().unwrap_or("server");
    match server.port() {
        Some(port) => format!("{}_{}.json", host, port),
        None => format!("{}.json", host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_is_promoted_to_https() {
        let settings = Settings::new("example.com", "a@b.com", 10, Some(PathBuf::from("c"))).unwrap();
        assert_eq!(settings.server_str(), "https://example.com");
    }

    #[test]
    fn test_trailing_slashes_are_stripped() {
        let settings =
            Settings::new("http://example.com////", "a@b.com", 10, Some(PathBuf::from("c")))
                .unwrap();
        assert_eq!(settings.server_str(), "http://example.com");
    }

    #[test]
    fn test_explicit_scheme_is_preserved() {
        let settings =
            Settings::new("http://localhost:8000", "a@b.com", 10, Some(PathBuf::from("c")))
                .unwrap();
        assert_eq!(settings.server_str(), "http://localhost:8000");
    }

    #[test]
    fn test_cache_file_name_includes_port() {
        let url = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(cache_file_name(&url), "localhost_8000.json");

        let url = Url::parse("https://allocator.example.com").unwrap();
        assert_eq!(cache_file_name(&url), "allocator.example.com.json");
    }

    #[test]
    fn test_invalid_server_address() {
        // A scheme with no host must not be promoted into a https URL
        for address in ["http://", "https://", "http:///"] {
            let result = Settings::new(address, "a@b.com", 10, Some(PathBuf::from("c")));
            assert!(result.is_err(), "expected '{}' to be rejected", address);
        }
    }
}

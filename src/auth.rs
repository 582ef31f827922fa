//! Authentication against the resource allocator server.
//!
//! Credentials are resolved from one of three sources: a password supplied
//! on the command line, an interactive no-echo prompt, or an Azure Active
//! Directory exchange delegated to an [`IdentityProvider`]. Successful
//! logins cache the issued session token keyed by server and email.

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::cache::{CacheError, CachedToken, TokenCache};
use crate::request::{build_body, Executor, RequestError};
use crate::settings::Settings;

/// Redirect target registered with the identity provider.
pub const AZURE_REDIRECT_URI: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("login response did not contain a token")]
    MissingToken,
    #[error("failed to read password: {0}")]
    Prompt(String),
    #[error("identity provider error: {0}")]
    IdentityProvider(String),
    #[error(transparent)]
    Request(RequestError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<RequestError> for AuthError {
    fn from(error: RequestError) -> Self {
        // The login endpoints signal bad credentials with 401/403
        if error.is_auth_rejection() {
            AuthError::InvalidCredentials
        } else {
            AuthError::Request(error)
        }
    }
}

/// How the password (or its substitute) is obtained for this invocation.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Password given on the command line.
    Password(String),
    /// Ask interactively, without echoing input.
    Prompt,
    /// Azure Active Directory alternate login.
    AzureAd,
}

/// Capability for interactive password entry.
///
/// The terminal implementation blocks on a human; tests substitute a
/// non-interactive one.
pub trait PasswordPrompt: Send + Sync {
    fn read_password(&self, email: &str) -> Result<String, AuthError>;
}

/// No-echo terminal prompt.
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&self, email: &str) -> Result<String, AuthError> {
        rpassword::prompt_password(format!("Password for {}: ", email))
            .map_err(|e| AuthError::Prompt(e.to_string()))
    }
}

/// Capability for obtaining an authorization code from an external
/// identity provider. The provider protocol itself lives outside this
/// crate; the result is an opaque code exchanged for a server token.
pub trait IdentityProvider: Send + Sync {
    fn obtain_code(&self, auth_url: &str) -> Result<String, AuthError>;
}

/// Interactive provider: directs the user to the authorization URL and
/// extracts the code from the pasted redirect.
pub struct PastedRedirectProvider;

impl IdentityProvider for PastedRedirectProvider {
    fn obtain_code(&self, auth_url: &str) -> Result<String, AuthError> {
        let mut stderr = std::io::stderr();
        writeln!(stderr, "Please visit the following URL to sign in:")
            .and_then(|_| writeln!(stderr, "{}", auth_url))
            .and_then(|_| write!(stderr, "Paste redirect URL: "))
            .and_then(|_| stderr.flush())
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?;

        extract_code(line.trim())
    }
}

/// Pull the `code` query parameter out of a redirect URL.
fn extract_code(redirect: &str) -> Result<String, AuthError> {
    let url = Url::parse(redirect)
        .map_err(|e| AuthError::IdentityProvider(format!("invalid redirect URL: {}", e)))?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            AuthError::IdentityProvider("redirect URL carries no 'code' parameter".to_string())
        })
}

/// Performs the authentication exchanges and maintains the token cache.
pub struct Authenticator<'a> {
    settings: &'a Settings,
    executor: &'a Executor,
    cache: &'a TokenCache,
    prompt: &'a dyn PasswordPrompt,
    provider: &'a dyn IdentityProvider,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        settings: &'a Settings,
        executor: &'a Executor,
        cache: &'a TokenCache,
        prompt: &'a dyn PasswordPrompt,
        provider: &'a dyn IdentityProvider,
    ) -> Self {
        Self {
            settings,
            executor,
            cache,
            prompt,
            provider,
        }
    }

    /// Return a usable session token, logging in only when the cache has
    /// none.
    pub async fn session_token(&self, source: &CredentialSource) -> Result<String, AuthError> {
        if let Some(entry) = self.cache.load(self.settings) {
            debug!("Using cached session token");
            return Ok(entry.token);
        }

        let response = self.login(source).await?;
        self.token_from(&response)
    }

    /// Log in with the given credential source and cache the issued token.
    /// Returns the full server response for display.
    pub async fn login(&self, source: &CredentialSource) -> Result<Value, AuthError> {
        let response = match source {
            CredentialSource::AzureAd => self.login_azure().await?,
            CredentialSource::Password(password) => self.login_password(password).await?,
            CredentialSource::Prompt => {
                let password = self.prompt.read_password(&self.settings.email)?;
                self.login_password(&password).await?
            }
        };

        self.cache_token(&response)?;
        info!("Logged in to {}", self.settings.server_str());
        Ok(response)
    }

    /// Register a new account, forwarding extra KEY=VALUE attributes such
    /// as first and last name, and cache the issued token.
    pub async fn register(
        &self,
        source: &CredentialSource,
        extra: &[(String, String)],
    ) -> Result<Value, AuthError> {
        let password = match source {
            CredentialSource::Password(password) => password.clone(),
            CredentialSource::Prompt => self.prompt.read_password(&self.settings.email)?,
            CredentialSource::AzureAd => {
                return Err(AuthError::IdentityProvider(
                    "registration via Azure AD is handled by the provider, not this client"
                        .to_string(),
                ))
            }
        };

        // Extras go through the request body builder so the image-path
        // substitution applies to registration payloads too
        let mut body = build_body(extra)?;
        body.insert("email".to_string(), Value::String(self.settings.email.clone()));
        body.insert("password".to_string(), Value::String(password));

        let response = self
            .executor
            .send(
                Method::POST,
                &self.executor.endpoint_url("register"),
                &[],
                Some(&body),
                None,
            )
            .await?;

        self.cache_token(&response)?;
        info!("Registered {} at {}", self.settings.email, self.settings.server_str());
        Ok(response)
    }

    async fn login_password(&self, password: &str) -> Result<Value, AuthError> {
        let mut body = Map::new();
        body.insert("email".to_string(), Value::String(self.settings.email.clone()));
        body.insert("password".to_string(), Value::String(password.to_string()));

        Ok(self
            .executor
            .send(
                Method::POST,
                &self.executor.endpoint_url("login"),
                &[],
                Some(&body),
                None,
            )
            .await?)
    }

    async fn login_azure(&self) -> Result<Value, AuthError> {
        let init = self
            .executor
            .send(
                Method::GET,
                &self.executor.endpoint_url("login_azure"),
                &[("redirect_uri".to_string(), AZURE_REDIRECT_URI.to_string())],
                None,
                None,
            )
            .await?;

        let auth_url = init
            .get("auth_url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AuthError::IdentityProvider("server sent no auth_url for Azure login".to_string())
            })?;

        let code = self.provider.obtain_code(auth_url)?;

        let mut body = Map::new();
        body.insert("code".to_string(), Value::String(code));
        body.insert("email".to_string(), Value::String(self.settings.email.clone()));
        body.insert(
            "redirect_uri".to_string(),
            Value::String(AZURE_REDIRECT_URI.to_string()),
        );

        Ok(self
            .executor
            .send(
                Method::POST,
                &self.executor.endpoint_url("login_azure"),
                &[],
                Some(&body),
                None,
            )
            .await?)
    }

    fn cache_token(&self, response: &Value) -> Result<(), AuthError> {
        let token = self.token_from(response)?;
        let expires_at = response
            .get("expires_at")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc));

        let entry = CachedToken::from_login(self.settings, token, expires_at);
        self.cache.store(&entry)?;
        Ok(())
    }

    fn token_from(&self, response: &Value) -> Result<String, AuthError> {
        response
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AuthError::MissingToken)
    }
}

//! Client facade tying together settings, token cache, authentication and
//! request execution.
//!
//! One `Client` handles one process invocation: at most one authentication
//! exchange followed by at most one resource request. Nothing is retried;
//! a rejected token clears the cache so the next invocation logs in fresh.

use serde_json::Value;
use tracing::debug;

use crate::auth::{
    Authenticator, CredentialSource, IdentityProvider, PastedRedirectProvider, PasswordPrompt,
    TerminalPrompt,
};
use crate::cache::TokenCache;
use crate::error::CliError;
use crate::params::ListModifiers;
use crate::request::Executor;
use crate::routes::{self, Action, Resource};
use crate::settings::Settings;

pub struct Client {
    settings: Settings,
    executor: Executor,
    cache: TokenCache,
    source: CredentialSource,
    prompt: Box<dyn PasswordPrompt>,
    provider: Box<dyn IdentityProvider>,
}

impl Client {
    /// Build a client with the interactive terminal capabilities.
    pub fn new(settings: Settings, source: CredentialSource) -> Result<Self, CliError> {
        Self::with_capabilities(
            settings,
            source,
            Box::new(TerminalPrompt),
            Box::new(PastedRedirectProvider),
        )
    }

    /// Build a client with substitute prompt and identity-provider
    /// implementations (used by tests and automation).
    pub fn with_capabilities(
        settings: Settings,
        source: CredentialSource,
        prompt: Box<dyn PasswordPrompt>,
        provider: Box<dyn IdentityProvider>,
    ) -> Result<Self, CliError> {
        let executor = Executor::new(&settings)?;
        let cache = TokenCache::new(settings.cache_path.clone());

        Ok(Self {
            settings,
            executor,
            cache,
            source,
            prompt,
            provider,
        })
    }

    fn authenticator(&self) -> Authenticator<'_> {
        Authenticator::new(
            &self.settings,
            &self.executor,
            &self.cache,
            self.prompt.as_ref(),
            self.provider.as_ref(),
        )
    }

    /// Explicit login: always performs the exchange, overwriting any cached
    /// token.
    pub async fn login(&self) -> Result<Value, CliError> {
        Ok(self.authenticator().login(&self.source).await?)
    }

    /// Register a new account and cache the issued token.
    pub async fn register(&self, extra: &[(String, String)]) -> Result<Value, CliError> {
        Ok(self.authenticator().register(&self.source, extra).await?)
    }

    /// Resolve, validate and execute one resource request.
    ///
    /// Routing errors surface before any network traffic. A 401/403 on the
    /// resource request clears the cached token and reports an
    /// authentication failure so the user can re-invoke and log in again.
    pub async fn perform(
        &self,
        resource: Resource,
        action: Action,
        id: Option<i64>,
        pairs: &[(String, String)],
        modifiers: &ListModifiers,
    ) -> Result<Value, CliError> {
        let template = routes::resolve(resource, action)?;
        routes::validate_invocation(&template, id, modifiers, !pairs.is_empty())?;

        let token = self.authenticator().session_token(&self.source).await?;

        match self
            .executor
            .execute(&template, &token, id, pairs, modifiers)
            .await
        {
            Ok(response) => Ok(response),
            Err(e) if e.is_auth_rejection() => {
                debug!("Server rejected the session token, clearing cache");
                if let Err(clear_error) = self.cache.clear() {
                    debug!("Could not clear token cache: {}", clear_error);
                }
                Err(CliError::Auth(crate::auth::AuthError::InvalidCredentials))
            }
            Err(e) => Err(CliError::from(e)),
        }
    }
}

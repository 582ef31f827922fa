//! Top-level error type for CLI command execution.

use thiserror::Error;

use crate::auth::AuthError;
use crate::cache::CacheError;
use crate::exit_codes::ExitCode;
use crate::format::FormattingError;
use crate::params::ParamError;
use crate::request::RequestError;
use crate::routes::RouteError;
use crate::settings::SettingsError;

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),
    /// Error when a required command-line argument is missing
    #[error("missing required argument: {0}")]
    MissingRequiredArgument(String),
    /// Authentication failure (bad credentials or rejected token)
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),
    /// Resource/action resolution failure, caught before any network call
    #[error("{0}")]
    Route(#[from] RouteError),
    /// Malformed KEY=VALUE or order-by input
    #[error("{0}")]
    Param(#[from] ParamError),
    /// Request construction or execution failure
    #[error("{0}")]
    Request(#[from] RequestError),
    /// Token cache I/O failure
    #[error("token cache error: {0}")]
    Cache(#[from] CacheError),
    /// Invalid server address or unresolvable cache location
    #[error("{0}")]
    Settings(#[from] SettingsError),
    /// Output rendering failure
    #[error("{0}")]
    Formatting(#[from] FormattingError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) => ExitCode::UsageError,
            CliError::MissingRequiredArgument(_) => ExitCode::UsageError,
            CliError::Auth(e) => match e {
                AuthError::Request(inner) => request_exit_code(inner),
                AuthError::Cache(_) => ExitCode::ConfigError,
                _ => ExitCode::AuthError,
            },
            CliError::Route(_) => ExitCode::UsageError,
            CliError::Param(_) => ExitCode::UsageError,
            CliError::Request(e) => request_exit_code(e),
            CliError::Cache(_) => ExitCode::ConfigError,
            CliError::Settings(_) => ExitCode::ConfigError,
            CliError::Formatting(_) => ExitCode::DataError,
        }
    }
}

fn request_exit_code(error: &RequestError) -> ExitCode {
    match error {
        RequestError::Api { status: 401 | 403, .. } => ExitCode::AuthError,
        RequestError::Api { .. } => ExitCode::ApiError,
        RequestError::Timeout | RequestError::Transport(_) => ExitCode::NetworkError,
        RequestError::ImageFile(_) | RequestError::ImageRead { .. } => ExitCode::NoInput,
        RequestError::Json(_) => ExitCode::DataError,
        RequestError::Http(_) => ExitCode::SoftwareError,
    }
}

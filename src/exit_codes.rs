//! Custom exit codes for the resource allocator client
//!
//! This module defines specific exit codes for different error conditions
//! to make scripting and automation easier.

/// Exit codes reported by the client
///
/// These codes follow the BSD sysexits.h conventions where possible:
/// - 0: Success
/// - 64-78: Standard exit codes from sysexits.h
/// - 100+: Custom application-specific codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0) - Command completed successfully
    Success = 0,

    /// Command line usage error (64) - User input error
    UsageError = 64,

    /// Data format error (65) - Input or response data was incorrect
    DataError = 65,

    /// Cannot open input file (66) - File not found or permission denied
    NoInput = 66,

    /// Internal software error (70) - Unexpected application error
    SoftwareError = 70,

    /// Configuration error (78) - Cache or settings issue
    ConfigError = 78,

    /// Authentication error (100) - Login or token issues
    AuthError = 100,

    /// Network error (101) - Connection or timeout issues
    NetworkError = 101,

    /// API error (102) - Remote API returned an error
    ApiError = 102,
}

impl ExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input file",
            ExitCode::SoftwareError => "Internal software error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::AuthError => "Authentication error",
            ExitCode::NetworkError => "Network communication error",
            ExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::UsageError.code(), 64);
        assert_eq!(ExitCode::AuthError.code(), 100);
        assert_eq!(ExitCode::ApiError.code(), 102);
    }

    #[test]
    fn test_exit_code_messages() {
        assert_eq!(ExitCode::Success.message(), "Success");
        assert_eq!(ExitCode::AuthError.message(), "Authentication error");
    }
}

//! Output formatting for API responses.
//!
//! Responses are rendered as JSON on stdout, pretty-printed by default.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormattingError {
    #[error("JSON formatting error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json(JsonOptions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json(JsonOptions { pretty: true })
    }
}

impl OutputFormat {
    pub fn compact() -> Self {
        OutputFormat::Json(JsonOptions { pretty: false })
    }
}

/// Render a response value in the requested format.
pub fn format_response(value: &Value, format: &OutputFormat) -> Result<String, FormattingError> {
    match format {
        OutputFormat::Json(options) => {
            if options.pretty {
                Ok(serde_json::to_string_pretty(value)?)
            } else {
                Ok(serde_json::to_string(value)?)
            }
        }
    }
}

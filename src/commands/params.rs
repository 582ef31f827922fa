//! Shared command parameters for all CLI commands.
//!
//! This module defines parameter names and common argument configurations
//! used across the command tree, providing a single place to keep the CLI
//! surface consistent.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Arg, ArgAction};

use crate::params::OrderBy;
use crate::settings::DEFAULT_TIMEOUT_SECS;

// Top-level commands
pub const COMMAND_REGISTER: &str = "register";
pub const COMMAND_LOGIN: &str = "login";

// Resource actions
pub const COMMAND_CREATE: &str = "create";
pub const COMMAND_GET: &str = "get";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_QUERY: &str = "query";
pub const COMMAND_UPDATE: &str = "update";
pub const COMMAND_DELETE: &str = "delete";
pub const COMMAND_APPROVE: &str = "approve";
pub const COMMAND_DECLINE: &str = "decline";

// Global connection parameters
pub const PARAMETER_SERVER: &str = "server";
pub const PARAMETER_EMAIL: &str = "email";
pub const PARAMETER_TIMEOUT: &str = "timeout";
pub const PARAMETER_PASSWORD: &str = "password";
pub const PARAMETER_AZURE_LOGIN: &str = "azure-login";
pub const PARAMETER_CACHE: &str = "cache";
pub const PARAMETER_COMPACT: &str = "compact";

// Per-action parameters
pub const PARAMETER_LIMIT: &str = "limit";
pub const PARAMETER_OFFSET: &str = "offset";
pub const PARAMETER_ORDER_BY: &str = "order-by";
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_DATA: &str = "data";

pub fn server_parameter() -> Arg {
    Arg::new(PARAMETER_SERVER)
        .short('s')
        .long("server")
        .required(true)
        .help("Server address")
}

pub fn email_parameter() -> Arg {
    Arg::new(PARAMETER_EMAIL)
        .short('e')
        .long("email")
        .required(true)
        .help("User email")
}

pub fn timeout_parameter() -> Arg {
    Arg::new(PARAMETER_TIMEOUT)
        .short('t')
        .long("timeout")
        .value_parser(clap::value_parser!(u64))
        .default_value(default_timeout_str())
        .help("Request timeout in seconds")
}

fn default_timeout_str() -> String {
    DEFAULT_TIMEOUT_SECS.to_string()
}

pub fn password_parameter() -> Arg {
    Arg::new(PARAMETER_PASSWORD)
        .short('p')
        .long("password")
        .conflicts_with(PARAMETER_AZURE_LOGIN)
        .help("User password. Leave blank for interactive entry")
}

pub fn azure_login_parameter() -> Arg {
    Arg::new(PARAMETER_AZURE_LOGIN)
        .short('a')
        .long("azure-login")
        .action(ArgAction::SetTrue)
        .help("Log in via Azure Active Directory")
}

pub fn cache_parameter() -> Arg {
    Arg::new(PARAMETER_CACHE)
        .short('c')
        .long("cache")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to the token cache file")
}

pub fn compact_parameter() -> Arg {
    Arg::new(PARAMETER_COMPACT)
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Print responses as compact JSON instead of pretty-printed")
}

pub fn limit_parameter() -> Arg {
    Arg::new(PARAMETER_LIMIT)
        .short('l')
        .long("limit")
        .value_parser(clap::value_parser!(u32))
        .help("Maximum number of items to return")
}

pub fn offset_parameter() -> Arg {
    Arg::new(PARAMETER_OFFSET)
        .short('o')
        .long("offset")
        .value_parser(clap::value_parser!(u32))
        .help("Number of items to skip")
}

pub fn order_by_parameter() -> Arg {
    Arg::new(PARAMETER_ORDER_BY)
        .long("order-by")
        .value_parser(parse_order_by)
        .help("Comma-separated sort columns; prefix a column with '-' for descending")
}

fn parse_order_by(raw: &str) -> Result<OrderBy, String> {
    OrderBy::from_str(raw).map_err(|e| e.to_string())
}

pub fn id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .long("id")
        .value_parser(clap::value_parser!(i64))
        .help("ID of the item")
}

pub fn data_parameter() -> Arg {
    Arg::new(PARAMETER_DATA)
        .num_args(0..)
        .value_name("KEY=VALUE")
        .help("Key-value pairs to create, update or query")
}

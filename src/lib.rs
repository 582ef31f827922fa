//! The resource allocator client library.
//!
//! This crate provides the core functionality for the resource allocator
//! CLI client: routing subcommands to API endpoints, building and executing
//! authenticated HTTP requests, and caching session tokens on disk.
//!
//! # Modules
//!
//! - `auth`: Authentication exchanges and credential capabilities
//! - `cache`: On-disk session-token cache
//! - `client`: Client facade wiring the components together
//! - `commands`: CLI command parsing
//! - `error`: Top-level error type and exit-code mapping
//! - `format`: Response output formatting
//! - `params`: KEY=VALUE and list-modifier parsing
//! - `request`: HTTP request building and execution
//! - `routes`: Resource/action routing table
//! - `settings`: Explicit per-invocation configuration

pub mod auth;
pub mod cache;
pub mod client;
pub mod commands;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod params;
pub mod request;
pub mod routes;
pub mod settings;

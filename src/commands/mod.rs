//! CLI command definitions and argument parsing.
//!
//! This module defines the command-line interface using the clap crate:
//! global connection flags, the `register` and `login` commands, and one
//! subcommand group per resource type.

use clap::{ArgMatches, Command};
use strum::IntoEnumIterator;

pub mod params;
pub mod resource;

use crate::routes::Resource;
use params::{
    azure_login_parameter, cache_parameter, compact_parameter, data_parameter, email_parameter,
    password_parameter, server_parameter, timeout_parameter, COMMAND_LOGIN, COMMAND_REGISTER,
};
use resource::resource_command;

/// Build the full command tree.
pub fn build_cli() -> Command {
    let mut command = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(server_parameter())
        .arg(email_parameter())
        .arg(timeout_parameter())
        .arg(password_parameter())
        .arg(azure_login_parameter())
        .arg(cache_parameter())
        .arg(compact_parameter())
        .subcommand(
            Command::new(COMMAND_REGISTER)
                .about("Register a new account on the server")
                .arg(data_parameter()),
        )
        .subcommand(Command::new(COMMAND_LOGIN).about("Log in and cache the session token"));

    for resource in Resource::iter() {
        command = command.subcommand(resource_command(resource));
    }

    command
}

/// Parse the process arguments against the command tree.
pub fn create_cli_commands() -> ArgMatches {
    build_cli().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        // clap panics on conflicting definitions; debug_assert catches them
        build_cli().debug_assert();
    }

    #[test]
    fn test_every_resource_has_a_subcommand() {
        let cli = build_cli();
        for resource in Resource::iter() {
            assert!(
                cli.find_subcommand(resource.to_string()).is_some(),
                "missing subcommand for {}",
                resource
            );
        }
    }

    #[test]
    fn test_list_accepts_modifiers() {
        let matches = build_cli()
            .try_get_matches_from([
                "resource_allocator_client",
                "-s",
                "http://x",
                "-e",
                "a@b.com",
                "requests",
                "list",
                "--limit",
                "10",
                "--offset",
                "5",
            ])
            .unwrap();

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "requests");
        let (action, action_matches) = sub.subcommand().unwrap();
        assert_eq!(action, "list");
        assert_eq!(
            action_matches.get_one::<u32>(params::PARAMETER_LIMIT),
            Some(&10)
        );
        assert_eq!(
            action_matches.get_one::<u32>(params::PARAMETER_OFFSET),
            Some(&5)
        );
    }

    #[test]
    fn test_password_conflicts_with_azure_login() {
        let result = build_cli().try_get_matches_from([
            "resource_allocator_client",
            "-s",
            "http://x",
            "-e",
            "a@b.com",
            "-p",
            "pw",
            "-a",
            "login",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_approve_only_defined_for_requests() {
        let cli = build_cli();
        let requests = cli.find_subcommand("requests").unwrap();
        assert!(requests.find_subcommand("approve").is_some());

        let resources = cli.find_subcommand("resources").unwrap();
        assert!(resources.find_subcommand("approve").is_none());
    }
}

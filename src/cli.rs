//! Dispatch from parsed command-line arguments into client calls.

use std::path::PathBuf;
use std::str::FromStr;

use clap::ArgMatches;

use resource_allocator_client::auth::CredentialSource;
use resource_allocator_client::client::Client;
use resource_allocator_client::commands::create_cli_commands;
use resource_allocator_client::commands::params::{
    COMMAND_LOGIN, COMMAND_REGISTER, PARAMETER_AZURE_LOGIN, PARAMETER_CACHE, PARAMETER_COMPACT,
    PARAMETER_DATA, PARAMETER_EMAIL, PARAMETER_ID, PARAMETER_LIMIT, PARAMETER_OFFSET,
    PARAMETER_ORDER_BY, PARAMETER_PASSWORD, PARAMETER_SERVER, PARAMETER_TIMEOUT,
};
use resource_allocator_client::error::CliError;
use resource_allocator_client::format::{format_response, OutputFormat};
use resource_allocator_client::params::{parse_pairs, ListModifiers, OrderBy};
use resource_allocator_client::routes::{Action, Resource};
use resource_allocator_client::settings::Settings;

/// Parse the command line, run the requested command and print the result.
pub async fn execute_command() -> Result<(), CliError> {
    let matches = create_cli_commands();

    let settings = settings_from(&matches)?;
    let source = credential_source(&matches);
    let format = if matches.get_flag(PARAMETER_COMPACT) {
        OutputFormat::compact()
    } else {
        OutputFormat::default()
    };

    let client = Client::new(settings, source)?;

    let response = match matches.subcommand() {
        Some((COMMAND_REGISTER, sub_matches)) => {
            let pairs = parse_pairs(&data_args(sub_matches))?;
            client.register(&pairs).await?
        }
        Some((COMMAND_LOGIN, _)) => client.login().await?,
        Some((name, sub_matches)) => {
            let resource = Resource::from_str(name)
                .map_err(|_| CliError::UnsupportedSubcommand(name.to_string()))?;
            let (action_name, action_matches) = sub_matches
                .subcommand()
                .ok_or_else(|| CliError::UnsupportedSubcommand(name.to_string()))?;
            let action = Action::from_str(action_name)
                .map_err(|_| CliError::UnsupportedSubcommand(action_name.to_string()))?;

            let id = opt_value::<i64>(action_matches, PARAMETER_ID);
            let modifiers = ListModifiers {
                limit: opt_value::<u32>(action_matches, PARAMETER_LIMIT),
                offset: opt_value::<u32>(action_matches, PARAMETER_OFFSET),
                order_by: opt_value::<OrderBy>(action_matches, PARAMETER_ORDER_BY),
            };
            let pairs = parse_pairs(&data_args(action_matches))?;

            client
                .perform(resource, action, id, &pairs, &modifiers)
                .await?
        }
        None => return Err(CliError::UnsupportedSubcommand("unknown".to_string())),
    };

    println!("{}", format_response(&response, &format)?);
    Ok(())
}

fn settings_from(matches: &ArgMatches) -> Result<Settings, CliError> {
    // Unwraps are safe: clap enforces required arguments and the timeout
    // default before this point
    let server = matches.get_one::<String>(PARAMETER_SERVER).unwrap();
    let email = matches.get_one::<String>(PARAMETER_EMAIL).unwrap();
    let timeout = *matches.get_one::<u64>(PARAMETER_TIMEOUT).unwrap();
    let cache_path = matches.get_one::<PathBuf>(PARAMETER_CACHE).cloned();

    Ok(Settings::new(server, email, timeout, cache_path)?)
}

fn credential_source(matches: &ArgMatches) -> CredentialSource {
    if let Some(password) = matches.get_one::<String>(PARAMETER_PASSWORD) {
        CredentialSource::Password(password.clone())
    } else if matches.get_flag(PARAMETER_AZURE_LOGIN) {
        CredentialSource::AzureAd
    } else {
        CredentialSource::Prompt
    }
}

/// Read an optional typed argument from a subcommand that may not define it.
fn opt_value<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches
        .try_get_one::<T>(name)
        .ok()
        .flatten()
        .cloned()
}

/// Collect trailing KEY=VALUE arguments, if the subcommand defines them.
fn data_args(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(PARAMETER_DATA)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

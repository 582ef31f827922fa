//! Per-resource command definitions.
//!
//! Every resource type gets the same CRUD subcommand set; allocation
//! requests additionally expose approve and decline.

use clap::Command;

use crate::commands::params::{
    data_parameter, id_parameter, limit_parameter, offset_parameter, order_by_parameter,
    COMMAND_APPROVE, COMMAND_CREATE, COMMAND_DECLINE, COMMAND_DELETE, COMMAND_GET, COMMAND_LIST,
    COMMAND_QUERY, COMMAND_UPDATE,
};
use crate::routes::Resource;

/// Build the subcommand tree for one resource type.
pub fn resource_command(resource: Resource) -> Command {
    let name = resource.to_string();
    let mut command = Command::new(name.clone())
        .about(format!("Operate on {}", name))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about(format!("Create an item in {}", name))
                .arg(data_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about(format!("Get a single item from {}", name))
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_LIST)
                .about(format!("List items from {}", name))
                .alias("ls")
                .arg(limit_parameter())
                .arg(offset_parameter())
                .arg(order_by_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_QUERY)
                .about(format!("Query {} by field values", name))
                .arg(limit_parameter())
                .arg(offset_parameter())
                .arg(order_by_parameter())
                .arg(data_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPDATE)
                .about(format!("Update an existing item in {}", name))
                .arg(id_parameter())
                .arg(data_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about(format!("Delete an item from {}", name))
                .arg(id_parameter()),
        );

    if resource == Resource::Requests {
        command = command
            .subcommand(
                Command::new(COMMAND_APPROVE)
                    .about("Approve an allocation request")
                    .arg(id_parameter()),
            )
            .subcommand(
                Command::new(COMMAND_DECLINE)
                    .about("Decline an allocation request")
                    .arg(id_parameter()),
            );
    }

    command
}

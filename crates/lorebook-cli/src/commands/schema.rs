use clap::{ArgMatches, Command};
use lorebook::roster_schema;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("schema").about("Print the JSON Schema of the contributor roster file")
}

pub fn run(_session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let schema = serde_json::to_value(roster_schema())?;
    Ok(CommandResult::Schema { schema })
}

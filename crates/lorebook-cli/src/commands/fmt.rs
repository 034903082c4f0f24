use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    Command::new("fmt")
        .about("Rewrite every article in canonical form")
        .arg(
            Arg::new("check")
                .long("check")
                .action(ArgAction::SetTrue)
                .help("List non-canonical articles without writing; exit 65 when any"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let mut library = session.open_library()?;
    let total = library.articles().len();

    if matches.get_flag("check") {
        let root = library.config().root();
        let non_canonical = library
            .non_canonical()?
            .into_iter()
            .map(|article| util::root_relative(root, article.path()))
            .collect();
        return Ok(CommandResult::FormatCheck {
            non_canonical,
            total,
        });
    }

    let written = library.save_all()?;
    Ok(CommandResult::Formatted { written, total })
}

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "lorebook";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments, builds the library configuration, and dispatches to
/// the selected command. Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let session = CliSession::bootstrap(
        matches.get_one::<PathBuf>("root").cloned(),
        matches.get_one::<PathBuf>("roster").cloned(),
        matches.get_one::<PathBuf>("templates").cloned(),
        verbosity,
    )?;
    if session.verbosity.verbose {
        tracing::info!(
            root = %session.config.root().display(),
            roster = ?session.config.roster(),
            templates = ?session.config.template_dir(),
            extensions = ?session.config.extensions(),
            "resolved library configuration"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("Lorebook knowledge article CLI")
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("PATH")
                .env("LOREBOOK_ROOT")
                .value_parser(value_parser!(PathBuf))
                .help("Documentation root to ingest. Defaults to the current directory."),
        )
        .arg(
            Arg::new("roster")
                .long("roster")
                .value_name("FILE")
                .env("LOREBOOK_ROSTER")
                .value_parser(value_parser!(PathBuf))
                .help("Contributor roster (.json)."),
        )
        .arg(
            Arg::new("templates")
                .long("templates")
                .value_name("DIR")
                .env("LOREBOOK_TEMPLATES")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding {Type}.template.md files for new articles."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log the resolved configuration before running."),
        )
        .subcommand_required(true)
        .subcommand(commands::status::command())
        .subcommand(commands::train::command())
        .subcommand(commands::fmt::command())
        .subcommand(commands::new::command())
        .subcommand(commands::schema::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("status", sub)) => commands::status::run(session, sub),
        Some(("train", sub)) => commands::train::run(session, sub),
        Some(("fmt", sub)) => commands::fmt::run(session, sub),
        Some(("new", sub)) => commands::new::run(session, sub),
        Some(("schema", sub)) => commands::schema::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }
}

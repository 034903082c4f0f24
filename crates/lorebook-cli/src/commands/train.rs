use chrono::Local;
use clap::{Arg, ArgMatches, Command};
use lorebook::DedupBasis;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    Command::new("train")
        .about("Record that a contributor completed training on an article")
        .arg(
            Arg::new("contributor")
                .long("contributor")
                .value_name("ACCOUNT")
                .required(true)
                .help("Contributor account name from the roster"),
        )
        .arg(
            Arg::new("article")
                .long("article")
                .value_name("ID|TITLE")
                .required(true)
                .help("Article id, or its title"),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .value_name("DATE")
                .help("Training date; defaults to today"),
        )
        .arg(
            Arg::new("dedup")
                .long("dedup")
                .value_name("BASIS")
                .value_parser(["training-date", "today"])
                .default_value("training-date")
                .help("Skip the entry when this day is already recorded"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let contributor = required(matches, "contributor")?;
    let article = required(matches, "article")?;
    let today = Local::now().date_naive();
    let date = match matches.get_one::<String>("date") {
        Some(raw) => util::date_arg(raw, "date")?,
        None => today,
    };
    let basis = match matches.get_one::<String>("dedup").map(String::as_str) {
        Some("today") => DedupBasis::Today,
        _ => DedupBasis::TrainingDate,
    };

    let mut library = session.open_library()?;
    let receipt = library.record_training(contributor, article, date, today, basis)?;

    Ok(CommandResult::Trained {
        contributor: receipt.contributor,
        article_id: receipt.article_id,
        date: receipt.date.format("%Y-%m-%d").to_string(),
        appended: receipt.appended,
    })
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, CliError> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| CliError::usage(format!("--{name} is required")))
}

use clap::{Arg, ArgMatches, Command};
use lorebook::{format_timestamp, local_now};
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

#[derive(Clone, Debug, Serialize)]
pub struct ArticleStatus {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub technology: String,
    pub path: String,
    pub training_required: bool,
    pub km_sync_required: bool,
}

impl ArticleStatus {
    pub fn is_due(&self) -> bool {
        self.training_required || self.km_sync_required
    }
}

pub fn command() -> Command {
    Command::new("status")
        .about("Ingest the library and report articles due for training or knowledge-base sync")
        .arg(
            Arg::new("now")
                .long("now")
                .value_name("DATE")
                .help("Evaluate staleness as of this date instead of the current time"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let now = match matches.get_one::<String>("now") {
        Some(raw) => util::timestamp_arg(raw, "now")?,
        None => local_now(),
    };
    let library = session.open_library()?;
    let root = library.config().root();

    let articles: Vec<ArticleStatus> = library
        .articles()
        .iter()
        .map(|article| ArticleStatus {
            id: article.id.clone(),
            title: article.title.clone(),
            kind: article.kind.to_string(),
            technology: article.technology.clone(),
            path: util::root_relative(root, article.path()),
            training_required: article.is_training_required(now),
            km_sync_required: article.is_km_sync_required(now),
        })
        .collect();
    let healthy = !articles.iter().any(ArticleStatus::is_due);

    Ok(CommandResult::Status {
        now: format_timestamp(&now),
        articles,
        healthy,
    })
}

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use lorebook::{DocumentType, NewArticle, new_article};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    Command::new("new")
        .about("Create a new article file from a template")
        .arg(
            Arg::new("title")
                .long("title")
                .required(true)
                .help("Article title"),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .value_name("TYPE")
                .required(true)
                .help("Document type, e.g. Create, Troubleshoot, \"Getting Started\""),
        )
        .arg(
            Arg::new("technology")
                .long("technology")
                .required(true)
                .help("Technology folder the article belongs to"),
        )
        .arg(Arg::new("section").long("section").help("Optional section name"))
        .arg(
            Arg::new("order")
                .long("order")
                .value_parser(value_parser!(u16))
                .help("Optional position within the section"),
        )
        .arg(
            Arg::new("author")
                .long("author")
                .action(ArgAction::Append)
                .help("Author account name; repeat for several"),
        )
        .arg(
            Arg::new("keyword")
                .long("keyword")
                .action(ArgAction::Append)
                .help("Keyword; repeat for several"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    session.config.validate()?;

    let raw_type = matches
        .get_one::<String>("type")
        .ok_or_else(|| CliError::usage("--type is required"))?;
    let kind: DocumentType = raw_type.parse().map_err(|_| {
        let known: Vec<&str> = DocumentType::ALL.iter().map(|k| k.as_str()).collect();
        CliError::usage(format!(
            "unknown type '{raw_type}'; expected one of {}",
            known.join(", ")
        ))
    })?;

    let mut request = NewArticle::new(
        string(matches, "title").unwrap_or_default(),
        kind,
        string(matches, "technology").unwrap_or_default(),
    );
    request.section = string(matches, "section");
    request.order = matches.get_one::<u16>("order").copied();
    request.author = strings(matches, "author");
    request.keywords = strings(matches, "keyword");

    let article = new_article(&session.config, request)?;
    Ok(CommandResult::ArticleCreated {
        id: article.id.clone(),
        title: article.title.clone(),
        path: util::root_relative(session.config.root(), article.path()),
    })
}

fn string(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn strings(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

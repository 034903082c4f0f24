use std::process::ExitCode;

use serde_json::json;

use crate::commands::CommandResult;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as human-readable text or a single JSON line and
/// converts the outcome into its exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result)?,
        OutputFormat::Json => print_json(&result),
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) -> Result<(), CliError> {
    match result {
        CommandResult::Status {
            now,
            articles,
            healthy,
        } => {
            let label = if *healthy { "OK" } else { "ATTENTION" };
            println!(
                "Library status as of {now}: {label} ({} articles)",
                articles.len()
            );
            for article in articles {
                let mut due = Vec::new();
                if article.training_required {
                    due.push("training required");
                }
                if article.km_sync_required {
                    due.push("km sync required");
                }
                if due.is_empty() {
                    println!("  [OK] {} ({}, {})", article.title, article.kind, article.path);
                } else {
                    println!(
                        "  [DUE] {} ({}, {}): {}",
                        article.title,
                        article.kind,
                        article.path,
                        due.join(", ")
                    );
                }
            }
        }
        CommandResult::Trained {
            contributor,
            article_id,
            date,
            appended,
        } => {
            if *appended {
                println!("Recorded training for {contributor} on {article_id} ({date})");
            } else {
                println!(
                    "Training for {contributor} on {article_id} already recorded; last-trained set to {date}"
                );
            }
        }
        CommandResult::Formatted { written, total } => {
            println!("Formatted {written} of {total} articles");
        }
        CommandResult::FormatCheck {
            non_canonical,
            total,
        } => {
            if non_canonical.is_empty() {
                println!("All {total} articles are canonical");
            } else {
                println!(
                    "{} of {total} articles are not canonical:",
                    non_canonical.len()
                );
                for path in non_canonical {
                    println!("  - {path}");
                }
            }
        }
        CommandResult::ArticleCreated { id, title, path } => {
            println!("Created article '{title}' ({id}) at {path}");
        }
        CommandResult::Schema { schema } => {
            println!("{}", serde_json::to_string_pretty(schema)?);
        }
    }
    Ok(())
}

fn print_json(result: &CommandResult) {
    let payload = json!(result);
    println!("{payload}");
}

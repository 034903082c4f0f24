use serde::Serialize;

use crate::error::ExitStatus;

pub mod fmt;
pub mod new;
pub mod schema;
pub mod status;
pub mod train;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    Status {
        now: String,
        articles: Vec<status::ArticleStatus>,
        healthy: bool,
    },
    Trained {
        contributor: String,
        article_id: String,
        date: String,
        appended: bool,
    },
    Formatted {
        written: usize,
        total: usize,
    },
    FormatCheck {
        non_canonical: Vec<String>,
        total: usize,
    },
    ArticleCreated {
        id: String,
        title: String,
        path: String,
    },
    Schema {
        schema: serde_json::Value,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Status { healthy, .. } => {
                if *healthy {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            CommandResult::FormatCheck { non_canonical, .. } => {
                if non_canonical.is_empty() {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}

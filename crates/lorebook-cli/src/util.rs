use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use lorebook::{parse_date, parse_timestamp};

use crate::error::CliError;

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

/// Path shown to the operator: relative to the library root when possible.
pub fn root_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

pub fn date_arg(value: &str, flag: &str) -> Result<NaiveDate, CliError> {
    parse_date(value).ok_or_else(|| {
        CliError::usage(format!("--{flag} '{value}' is not a date (expected YYYY-MM-DD)"))
    })
}

pub fn timestamp_arg(value: &str, flag: &str) -> Result<NaiveDateTime, CliError> {
    parse_timestamp(value).ok_or_else(|| {
        CliError::usage(format!("--{flag} '{value}' is not a date (expected YYYY-MM-DD)"))
    })
}

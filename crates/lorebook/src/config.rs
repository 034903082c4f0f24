use std::path::{Path, PathBuf};

use crate::error::{LorebookError, Result};

/// Extensions accepted by the scanner when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "yaml"];

/// Extension of metadata-bearing documents. Everything else the scanner
/// accepts is treated as raw data.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Locations the library works against, passed explicitly into every entry
/// point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryConfig {
    root: PathBuf,
    roster: Option<PathBuf>,
    template_dir: Option<PathBuf>,
    extensions: Vec<String>,
}

impl LibraryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            roster: None,
            template_dir: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn with_roster(mut self, roster: impl Into<PathBuf>) -> Self {
        self.roster = Some(roster.into());
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Replaces the accepted extensions. Leading dots are ignored.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn roster(&self) -> Option<&Path> {
        self.roster.as_deref()
    }

    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// True when `path` carries one of the accepted extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
    }

    /// Human readable list such as `.md or .yaml`.
    pub fn describe_extensions(&self) -> String {
        let dotted: Vec<String> = self.extensions.iter().map(|ext| format!(".{ext}")).collect();
        match dotted.split_last() {
            None => "(none)".to_string(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        }
    }

    /// Rejects locations that do not exist or have the wrong shape. Runs
    /// before any ingestion work.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(LorebookError::configuration(format!(
                "the root directory {} does not exist",
                self.root.display()
            )));
        }
        if self.extensions.is_empty() {
            return Err(LorebookError::configuration(
                "at least one file extension must be accepted",
            ));
        }
        if let Some(roster) = &self.roster {
            let is_json = roster
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if !is_json {
                return Err(LorebookError::configuration(format!(
                    "the roster file {} must be a .json file",
                    roster.display()
                )));
            }
            if !roster.is_file() {
                return Err(LorebookError::configuration(format!(
                    "the roster file {} does not exist",
                    roster.display()
                )));
            }
        }
        if let Some(dir) = &self.template_dir {
            if !dir.is_dir() {
                return Err(LorebookError::configuration(format!(
                    "the template directory {} does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

use std::path::PathBuf;

use lorebook::{Library, LibraryConfig};

use crate::error::CliError;
use crate::util::Verbosity;

pub struct CliSession {
    pub config: LibraryConfig,
    pub verbosity: Verbosity,
}

impl CliSession {
    /// Builds the library configuration from flags (or their environment
    /// variables). The root defaults to the current directory.
    pub fn bootstrap(
        root: Option<PathBuf>,
        roster: Option<PathBuf>,
        templates: Option<PathBuf>,
        verbosity: Verbosity,
    ) -> Result<Self, CliError> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|err| {
                CliError::new(
                    format!("unable to resolve the current directory: {err}"),
                    crate::error::ExitStatus::Io,
                )
            })?,
        };

        let mut config = LibraryConfig::new(root);
        if let Some(roster) = roster {
            config = config.with_roster(roster);
        }
        if let Some(templates) = templates {
            config = config.with_template_dir(templates);
        }

        Ok(Self { config, verbosity })
    }

    /// Ingests the configured root and loads the roster.
    pub fn open_library(&self) -> Result<Library, CliError> {
        Ok(Library::open(self.config.clone())?)
    }
}

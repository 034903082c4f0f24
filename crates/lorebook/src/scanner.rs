//! Recursive discovery of candidate documents under the library root.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibraryConfig;
use crate::error::{LorebookError, Result};

/// Lazy, stably ordered walk over the accepted files below a root.
///
/// Entries are visited depth-first with siblings sorted by file name, so two
/// scans of an unchanged tree yield the same sequence.
pub struct Scan<'a> {
    config: &'a LibraryConfig,
    walker: walkdir::IntoIter,
}

/// Starts a scan after checking the tree holds something worth ingesting.
///
/// The pre-check stops at the first accepted file, so only an empty or
/// mismatched tree is walked in full before an error is raised.
pub fn scan(config: &LibraryConfig) -> Result<Scan<'_>> {
    let root = config.root();
    if !root.is_dir() {
        return Err(LorebookError::configuration(format!(
            "the root directory {} does not exist",
            root.display()
        )));
    }

    let mut saw_file = false;
    for entry in walker(root) {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        if !entry.file_type().is_file() {
            continue;
        }
        saw_file = true;
        if config.accepts(entry.path()) {
            return Ok(Scan {
                config,
                walker: walker(root),
            });
        }
    }

    if saw_file {
        Err(LorebookError::configuration(format!(
            "no files with extensions {} were found in {}",
            config.describe_extensions(),
            root.display()
        )))
    } else {
        Err(LorebookError::configuration(format!(
            "no files were found in {}",
            root.display()
        )))
    }
}

fn walker(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}

fn walk_error(root: &Path, err: walkdir::Error) -> LorebookError {
    let path = err.path().map_or_else(|| root.to_path_buf(), |p| p.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    LorebookError::io(path, source)
}

impl Iterator for Scan<'_> {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(walk_error(self.config.root(), err))),
            };
            if entry.file_type().is_file() && self.config.accepts(entry.path()) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_root_reports_no_files() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        let config = LibraryConfig::new(temp.path());
        let err = scan(&config).err().unwrap();
        assert!(matches!(err, LorebookError::Configuration(_)));
        assert!(err.to_string().contains("no files were found"), "{err}");
    }

    #[test]
    fn mismatched_extensions_name_the_expected_ones() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("notes.txt"), "hi").unwrap();
        let config = LibraryConfig::new(temp.path());
        let err = scan(&config).err().unwrap();
        let message = err.to_string();
        assert!(message.contains("no files with extensions .md or .yaml"), "{message}");
    }

    #[test]
    fn yields_accepted_files_recursively_in_stable_order() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("Linux");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.md"), "").unwrap();
        fs::write(nested.join("a.yaml"), "").unwrap();
        fs::write(temp.path().join("z.md"), "").unwrap();
        fs::write(temp.path().join("skip.txt"), "").unwrap();

        let config = LibraryConfig::new(temp.path());
        let found: Vec<PathBuf> = scan(&config).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(
            found,
            vec![nested.join("a.yaml"), nested.join("b.md"), temp.path().join("z.md")]
        );
    }
}

//! Per-file pipeline (split, classify, decode) and the parallel batch
//! driver on top of it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::article::Article;
use crate::classify::{Classification, classify};
use crate::config::{DOCUMENT_EXTENSION, LibraryConfig};
use crate::decode::decode_article;
use crate::error::{DecodeError, DecodeErrorKind, LorebookError, Result};
use crate::front_matter::split_front_matter;
use crate::kinds::SkipTag;
use crate::scanner::scan;
use crate::serializer::content_digest;

/// Why a file produced no article. None of these are errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    NoFrontMatter,
    RawData,
    KnownTag(SkipTag),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Empty => f.write_str("file is empty"),
            SkipReason::NoFrontMatter => f.write_str("no metadata block"),
            SkipReason::RawData => f.write_str("raw data file"),
            SkipReason::KnownTag(tag) => write!(f, "non-article type [{tag}]"),
        }
    }
}

/// Result of running one file through the pipeline.
#[derive(Debug)]
pub enum Outcome {
    Article(Box<Article>),
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Runs a single file through split, classify and decode.
pub fn process_file(path: &Path) -> Result<Outcome> {
    let is_document = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
    if !is_document {
        return Ok(skipped(path, SkipReason::RawData));
    }

    let bytes = fs::read(path).map_err(|err| LorebookError::io(path, err))?;
    let content = String::from_utf8(bytes).map_err(|err| {
        LorebookError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        )
    })?;
    process_text(path, &content)
}

/// Same as [`process_file`] for content already in memory.
pub fn process_text(path: &Path, content: &str) -> Result<Outcome> {
    if content.trim().is_empty() {
        return Ok(skipped(path, SkipReason::Empty));
    }
    let Some(split) = split_front_matter(content) else {
        return Ok(skipped(path, SkipReason::NoFrontMatter));
    };

    match classify(path, split.yaml)? {
        Classification::Skip(tag) => Ok(skipped(path, SkipReason::KnownTag(tag))),
        Classification::Article(kind) => {
            let mut article = decode_article(path, split.yaml)?;
            debug_assert_eq!(article.kind, kind);
            article.set_path(path);
            article.set_body(split.body);
            article.source_digest = Some(content_digest(content.as_bytes()));
            debug!(path = %path.display(), id = %article.id, kind = %kind, "decoded article");
            Ok(Outcome::Article(Box::new(article)))
        }
    }
}

fn skipped(path: &Path, reason: SkipReason) -> Outcome {
    debug!(path = %path.display(), %reason, "skipped file");
    Outcome::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

/// Ingests every accepted file under the configured root.
///
/// Files are processed on the rayon pool. When any file fails, files later
/// in scan order than the earliest failure are not started and the earliest
/// failure is returned, so the reported error does not depend on scheduling.
/// On success the articles come back in scan order.
pub fn ingest(config: &LibraryConfig) -> Result<Vec<Article>> {
    config.validate()?;
    let paths: Vec<PathBuf> = scan(config)?.collect::<Result<_>>()?;

    let first_error: Mutex<Option<(usize, LorebookError)>> = Mutex::new(None);
    let outcomes: Vec<Option<Outcome>> = paths
        .par_iter()
        .enumerate()
        .map(|(idx, path)| {
            if first_error.lock().as_ref().is_some_and(|(at, _)| *at < idx) {
                return None;
            }
            match process_file(path) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    let mut slot = first_error.lock();
                    if slot.as_ref().is_none_or(|(at, _)| idx < *at) {
                        *slot = Some((idx, err));
                    }
                    None
                }
            }
        })
        .collect();

    if let Some((_, err)) = first_error.into_inner() {
        return Err(err);
    }

    let mut articles = Vec::new();
    let mut skipped = 0usize;
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            Outcome::Article(article) => articles.push(*article),
            Outcome::Skipped { .. } => skipped += 1,
        }
    }
    ensure_unique_ids(&articles)?;

    info!(
        root = %config.root().display(),
        files = paths.len(),
        articles = articles.len(),
        skipped,
        "ingestion complete"
    );
    Ok(articles)
}

fn ensure_unique_ids(articles: &[Article]) -> Result<()> {
    let mut seen: HashMap<&str, &Path> = HashMap::with_capacity(articles.len());
    for article in articles {
        if let Some(first) = seen.insert(&article.id, article.path()) {
            return Err(DecodeError::new(
                article.path(),
                DecodeErrorKind::DuplicateId {
                    id: article.id.clone(),
                    first: first.to_path_buf(),
                },
            )
            .into());
        }
    }
    Ok(())
}

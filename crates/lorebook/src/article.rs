use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use url::Url;

use crate::kinds::{Difficulty, DocumentType, Skillset, TrainingFrequency};

/// A process or knowledge article decoded from a document's front matter.
///
/// `path` and `body` are not metadata; they are attached by ingestion (or by
/// [`crate::new_article`]) and consumed by the serializer.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub kind: DocumentType,
    pub technology: String,
    pub summary: Option<String>,
    pub difficulty: Difficulty,
    pub skillset: Skillset,
    pub section: Option<String>,
    pub order: Option<u16>,
    pub keywords: Keywords,
    pub author: Vec<String>,
    pub sme: Vec<String>,
    pub verified_metadata_date: Option<NaiveDateTime>,
    pub verified_content_date: Option<NaiveDateTime>,
    pub disable_publication: bool,
    pub is_training_topic: bool,
    pub training_frequency: Option<TrainingFrequency>,
    pub last_trained: Option<NaiveDateTime>,
    pub km_id: Option<String>,
    pub km_last_sync: Option<NaiveDateTime>,
    pub references: Vec<ReferenceLink>,
    pub software_version: Vec<String>,
    pub is_impacting: bool,
    pub(crate) path: PathBuf,
    pub(crate) body: String,
    pub(crate) source_digest: Option<String>,
}

impl Article {
    /// Creates an article with the required identity fields and a fresh id.
    pub fn new(
        title: impl Into<String>,
        kind: DocumentType,
        technology: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            kind,
            technology: technology.into(),
            summary: None,
            difficulty: Difficulty::default(),
            skillset: Skillset::default(),
            section: None,
            order: None,
            keywords: Keywords::default(),
            author: Vec::new(),
            sme: Vec::new(),
            verified_metadata_date: None,
            verified_content_date: None,
            disable_publication: false,
            is_training_topic: false,
            training_frequency: None,
            last_trained: None,
            km_id: None,
            km_last_sync: None,
            references: Vec::new(),
            software_version: Vec::new(),
            is_impacting: false,
            path: PathBuf::new(),
            body: String::new(),
            source_digest: None,
        }
    }

    /// File this article is saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// Document content after the metadata block.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }
}

impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Fresh opaque identifier for articles that do not carry one.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Link to a related article or knowledge-base entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceLink {
    pub title: String,
    pub link: Url,
}

/// Keyword set that keeps first-seen order for display.
///
/// Membership and equality ignore case and order; duplicates are dropped on
/// insert so the rendered list is always unique.
#[derive(Clone, Debug, Default)]
pub struct Keywords(Vec<String>);

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyword unless an equal one (ignoring case) is present.
    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if keyword.trim().is_empty() || self.contains(&keyword) {
            return false;
        }
        self.0.push(keyword);
        true
    }

    pub fn contains(&self, keyword: &str) -> bool {
        let wanted = keyword.to_lowercase();
        self.0.iter().any(|k| k.to_lowercase() == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl PartialEq for Keywords {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<S: Into<String>> FromIterator<S> for Keywords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut keywords = Keywords::new();
        for keyword in iter {
            keywords.insert(keyword);
        }
        keywords
    }
}

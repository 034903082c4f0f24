//! Canonical re-rendering of an article back into a document.

use std::fs;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::article::Article;
use crate::body::normalize_body;
use crate::error::{LorebookError, Result};
use crate::front_matter::SENTINEL;
use crate::kinds::{Difficulty, DocumentType, Skillset, TrainingFrequency};
use crate::timestamp::format_timestamp;

/// Metadata block in canonical key order. Field order here is the order
/// written to disk.
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct CanonicalFrontMatter<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    kind: DocumentType,
    technology: &'a str,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    difficulty: Difficulty,
    skillset: Skillset,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keywords: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    author: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sme: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verified_metadata_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verified_content_date: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    disable_publication: bool,
    #[serde(skip_serializing_if = "is_false")]
    is_training_topic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    training_frequency: Option<TrainingFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_trained: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    km_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    km_last_sync: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    references: Vec<CanonicalReference<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    software_version: Vec<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    is_impacting: bool,
}

#[derive(Serialize)]
struct CanonicalReference<'a> {
    title: &'a str,
    link: &'a str,
}

fn non_blank_items(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .collect()
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl<'a> From<&'a Article> for CanonicalFrontMatter<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            id: &article.id,
            title: &article.title,
            kind: article.kind,
            technology: &article.technology,
            summary: non_blank(&article.summary),
            difficulty: article.difficulty,
            skillset: article.skillset,
            section: non_blank(&article.section),
            order: article.order,
            keywords: non_blank_items(article.keywords.as_slice()),
            author: non_blank_items(&article.author),
            sme: non_blank_items(&article.sme),
            verified_metadata_date: article.verified_metadata_date.as_ref().map(format_timestamp),
            verified_content_date: article.verified_content_date.as_ref().map(format_timestamp),
            disable_publication: article.disable_publication,
            is_training_topic: article.is_training_topic,
            training_frequency: article.training_frequency,
            last_trained: article.last_trained.as_ref().map(format_timestamp),
            km_id: non_blank(&article.km_id),
            km_last_sync: article.km_last_sync.as_ref().map(format_timestamp),
            references: article
                .references
                .iter()
                .map(|r| CanonicalReference {
                    title: &r.title,
                    link: r.link.as_str(),
                })
                .collect(),
            software_version: non_blank_items(&article.software_version),
            is_impacting: article.is_impacting,
        }
    }
}

/// Encodes the article's metadata block (without sentinels).
pub fn encode_front_matter(article: &Article) -> Result<String> {
    let yaml = serde_yaml::to_string(&CanonicalFrontMatter::from(article))
        .map_err(|err| LorebookError::Serialization(err.to_string()))?;
    let yaml_clean = yaml.trim_start_matches(SENTINEL).trim_start();
    Ok(format!("{}\n", yaml_clean.trim_end()))
}

/// Renders the full document text: sentinel-wrapped metadata followed by the
/// normalised body.
pub fn render_document(article: &Article) -> Result<String> {
    let front = encode_front_matter(article)?;
    Ok(format!(
        "{SENTINEL}\n{front}{SENTINEL}\n{}",
        normalize_body(&article.body)
    ))
}

/// Hex SHA-256 digest of document bytes.
pub fn content_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

impl Article {
    /// Canonical document text for this article.
    pub fn render(&self) -> Result<String> {
        render_document(self)
    }

    /// True when the file this article was loaded from (or last saved to)
    /// already holds the canonical rendering.
    pub fn is_canonical(&self) -> Result<bool> {
        let rendered = self.render()?;
        Ok(self.source_digest.as_deref() == Some(content_digest(rendered.as_bytes()).as_str()))
    }

    /// Overwrites the article's file with its canonical rendering.
    pub fn save(&mut self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LorebookError::configuration(format!(
                "article '{}' has no file path to save to",
                self.title
            )));
        }
        let rendered = self.render()?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| LorebookError::io(dir, err))?;
        }
        fs::write(&self.path, &rendered).map_err(|err| LorebookError::io(&self.path, err))?;
        self.body = normalize_body(&self.body);
        self.source_digest = Some(content_digest(rendered.as_bytes()));
        debug!(path = %self.path.display(), id = %self.id, "saved article");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_article;
    use crate::front_matter::split_front_matter;
    use std::path::Path;

    fn reparse(doc: &str) -> Article {
        let split = split_front_matter(doc).expect("rendered document has front matter");
        let mut article = decode_article(Path::new("x.md"), split.yaml).unwrap();
        article.set_body(split.body);
        article
    }

    #[test]
    fn omits_default_and_empty_fields() {
        let mut article = Article::new("Minimal", DocumentType::Blog, "Linux");
        article.id = "fixed-id".into();
        article.section = Some(String::new());
        let yaml = encode_front_matter(&article).unwrap();
        assert_eq!(
            yaml,
            "id: fixed-id\ntitle: Minimal\ntype: Blog\ntechnology: Linux\ndifficulty: InDevelopment\nskillset: Any\n"
        );
    }

    #[test]
    fn writes_canonical_keys_and_dates() {
        let yaml = "title: T\ntype: modify\ntechnology: W\ntraining-topic: true\ntraining-frequency: yearly\nlast-trained: 03/23/2022\n";
        let article = decode_article(Path::new("x.md"), yaml).unwrap();
        let encoded = encode_front_matter(&article).unwrap();
        assert!(encoded.contains("type: Modify\n"), "{encoded}");
        assert!(encoded.contains("is-training-topic: true\n"), "{encoded}");
        assert!(encoded.contains("training-frequency: Yearly\n"), "{encoded}");
        assert!(encoded.contains("2022-03-23"), "{encoded}");
    }

    #[test]
    fn render_is_idempotent_through_decode() {
        let mut article = Article::new("Round Trip", DocumentType::Troubleshoot, "Storage");
        article.keywords = ["b", "a", "true", "6.7"].into_iter().collect();
        article.software_version = vec!["6.7".into(), "7".into()];
        article.order = Some(3);
        article.km_id = Some("KM1".into());
        article.set_body("\n# Heading  \n\n\n\ntext\n");

        let first = render_document(&article).unwrap();
        let second = render_document(&reparse(&first)).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("---\nid: "));
        assert!(first.ends_with("---\n# Heading\n\ntext\n"), "{first}");
    }

    #[test]
    fn save_writes_file_and_marks_canonical() {
        let temp = tempfile::tempdir().unwrap();
        let mut article = Article::new("Saved", DocumentType::Create, "Linux");
        article.set_path(temp.path().join("Linux").join("Create - Saved.md"));
        article.set_body("body");

        assert!(!article.is_canonical().unwrap());
        article.save().unwrap();
        assert!(article.is_canonical().unwrap());

        let on_disk = fs::read_to_string(article.path()).unwrap();
        assert_eq!(on_disk, article.render().unwrap());
    }

    #[test]
    fn save_without_path_is_configuration_error() {
        let mut article = Article::new("Nowhere", DocumentType::Create, "Linux");
        assert!(matches!(article.save(), Err(LorebookError::Configuration(_))));
    }
}

//! Creation of new article files from a title, type and technology.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use handlebars::Handlebars;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::article::Article;
use crate::config::LibraryConfig;
use crate::error::{LorebookError, Result};
use crate::kinds::{Difficulty, DocumentType, Skillset, TrainingFrequency};

/// Body used when no template exists for the article's type.
pub const PLACEHOLDER_BODY: &str = "<!-- Add content -->\n";

fn sanitize_file_name(name: &str) -> Cow<'_, str> {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();
    let re = INVALID_CHARS
        .get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("Invalid regex"));
    re.replace_all(name, "_")
}

/// Inputs for [`new_article`]. Only title, type and technology are required.
#[derive(Clone, Debug, Default)]
pub struct NewArticle {
    pub title: String,
    pub kind: Option<DocumentType>,
    pub technology: String,
    pub section: Option<String>,
    pub order: Option<u16>,
    pub summary: Option<String>,
    pub author: Vec<String>,
    pub sme: Vec<String>,
    pub keywords: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub skillset: Option<Skillset>,
    pub is_training_topic: bool,
    pub training_frequency: Option<TrainingFrequency>,
}

impl NewArticle {
    pub fn new(title: impl Into<String>, kind: DocumentType, technology: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: Some(kind),
            technology: technology.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct TemplateTokens<'a> {
    title: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    technology: &'a str,
    section: &'a str,
}

/// File name for an article: `{Type}[.{Section}][.{Order}] - {Title}.md`.
///
/// An order of zero is treated as absent. Characters that are not valid in
/// file names are replaced with `_`.
pub fn article_file_name(
    kind: DocumentType,
    title: &str,
    section: Option<&str>,
    order: Option<u16>,
) -> String {
    let mut stem = kind.as_str().to_string();
    if let Some(section) = section.map(str::trim).filter(|s| !s.is_empty()) {
        stem.push('.');
        stem.push_str(section);
    }
    if let Some(order) = order.filter(|o| *o != 0) {
        stem.push('.');
        stem.push_str(&order.to_string());
    }
    let name = format!("{stem} - {}.md", title.trim());
    sanitize_file_name(&name).into_owned()
}

/// Creates and saves a new article under `{root}/{technology}/`.
///
/// The body comes from `{template_dir}/{Type}.template.md` when such a
/// template exists, otherwise [`PLACEHOLDER_BODY`]. Never overwrites an
/// existing file.
pub fn new_article(config: &LibraryConfig, request: NewArticle) -> Result<Article> {
    let kind = request
        .kind
        .ok_or_else(|| LorebookError::configuration("a new article needs a type"))?;
    let title = request.title.trim();
    if title.is_empty() {
        return Err(LorebookError::configuration("a new article needs a title"));
    }
    let technology = request.technology.trim();
    if technology.is_empty() {
        return Err(LorebookError::configuration("a new article needs a technology"));
    }

    let dir = config.root().join(sanitize_file_name(technology).as_ref());
    let path = dir.join(article_file_name(
        kind,
        title,
        request.section.as_deref(),
        request.order,
    ));
    if path.exists() {
        return Err(LorebookError::configuration(format!(
            "{} already exists; refusing to overwrite it",
            path.display()
        )));
    }

    let mut article = Article::new(title, kind, technology);
    article.section = request.section.filter(|s| !s.trim().is_empty());
    article.order = request.order.filter(|o| *o != 0);
    article.summary = request.summary.filter(|s| !s.trim().is_empty());
    article.author = request.author;
    article.sme = request.sme;
    article.keywords = request.keywords.into_iter().collect();
    article.difficulty = request.difficulty.unwrap_or_default();
    article.skillset = request.skillset.unwrap_or_default();
    article.is_training_topic = request.is_training_topic;
    article.training_frequency = request.training_frequency;

    let body = match template_path(config, kind) {
        Some(template) => render_template(&template, &article)?,
        None => PLACEHOLDER_BODY.to_string(),
    };
    article.set_body(body);
    article.set_path(path);
    article.save()?;
    info!(path = %article.path().display(), id = %article.id, "created article");
    Ok(article)
}

fn template_path(config: &LibraryConfig, kind: DocumentType) -> Option<PathBuf> {
    let path = config
        .template_dir()?
        .join(format!("{}.template.md", kind.as_str()));
    path.is_file().then_some(path)
}

fn render_template(path: &Path, article: &Article) -> Result<String> {
    let raw = fs::read_to_string(path).map_err(|err| LorebookError::io(path, err))?;
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    let tokens = TemplateTokens {
        title: &article.title,
        kind: article.kind.as_str(),
        technology: &article.technology,
        section: article.section.as_deref().unwrap_or_default(),
    };
    registry
        .render_template(&raw, &tokens)
        .map_err(|err| LorebookError::Serialization(format!("{}: {err}", path.display())))
}

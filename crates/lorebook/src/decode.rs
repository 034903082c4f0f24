//! Strict decode of a metadata block into an [`Article`].
//!
//! The block is first read into a loosely typed [`RawArticle`] so that
//! structural YAML problems and field-level validation failures can be
//! reported separately, each naming the file and the offending field.
//!
//! `Value` normalises plain numbers (`6.10` reads back as `6.1`), so the
//! text fields are read a second time into [`SourceText`], which keeps the
//! scalars exactly as written.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_yaml::Value;
use tracing::debug;
use url::Url;

use crate::article::{Article, Keywords, ReferenceLink};
use crate::error::DecodeError;
use crate::kinds::{ClosedSet, Difficulty, DocumentType, Skillset, TrainingFrequency};
use crate::timestamp::parse_timestamp;

type DecodeResult<T> = Result<T, DecodeError>;

/// Parsed view of the raw YAML front matter attached to an article.
///
/// Every field is optional here; requirements are enforced by
/// [`decode_article`]. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawArticle {
    id: Option<Value>,
    title: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    technology: Option<Value>,
    #[serde(rename = "abstract")]
    summary: Option<Value>,
    difficulty: Option<Value>,
    skillset: Option<Value>,
    section: Option<Value>,
    order: Option<Value>,
    keywords: Option<Value>,
    author: Option<Value>,
    sme: Option<Value>,
    #[serde(alias = "verified-metadata")]
    verified_metadata_date: Option<Value>,
    #[serde(alias = "verified-content")]
    verified_content_date: Option<Value>,
    disable_publication: Option<Value>,
    #[serde(alias = "training-topic")]
    is_training_topic: Option<Value>,
    training_frequency: Option<Value>,
    last_trained: Option<Value>,
    km_id: Option<Value>,
    km_last_sync: Option<Value>,
    references: Option<Value>,
    software_version: Option<Value>,
    is_impacting: Option<Value>,
}

/// Decodes and validates a metadata block.
///
/// `path` is used only for error context; the caller attaches it to the
/// returned article.
pub fn decode_article(path: &Path, yaml: &str) -> DecodeResult<Article> {
    let raw: RawArticle = serde_yaml::from_str(yaml)
        .map_err(|err| DecodeError::structural(path, err.to_string()))?;
    let source = SourceText::read(path, yaml, &raw);
    let fields = FieldReader {
        path,
        source: &source,
    };

    let title = fields.required_text("title", raw.title.as_ref())?;
    let kind = fields
        .closed::<DocumentType>("type", raw.kind.as_ref())?
        .ok_or_else(|| DecodeError::missing(path, "type"))?;
    let technology = fields.required_text("technology", raw.technology.as_ref())?;

    let mut article = Article::new(title, kind, technology);
    if let Some(id) = fields.optional_text("id", raw.id.as_ref())? {
        article.id = id;
    }

    article.summary = fields.optional_text("abstract", raw.summary.as_ref())?;
    article.difficulty = fields
        .closed::<Difficulty>("difficulty", raw.difficulty.as_ref())?
        .unwrap_or_default();
    article.skillset = fields
        .closed::<Skillset>("skillset", raw.skillset.as_ref())?
        .unwrap_or_default();
    article.section = fields.optional_text("section", raw.section.as_ref())?;
    article.order = fields.order(raw.order.as_ref())?;
    article.keywords = fields
        .text_list("keywords", raw.keywords.as_ref())?
        .into_iter()
        .collect::<Keywords>();
    article.author = fields.text_list("author", raw.author.as_ref())?;
    article.sme = fields.text_list("sme", raw.sme.as_ref())?;
    article.verified_metadata_date =
        fields.timestamp("verified-metadata-date", raw.verified_metadata_date.as_ref())?;
    article.verified_content_date =
        fields.timestamp("verified-content-date", raw.verified_content_date.as_ref())?;
    article.disable_publication =
        fields.flag("disable-publication", raw.disable_publication.as_ref())?;
    article.is_training_topic = fields.flag("is-training-topic", raw.is_training_topic.as_ref())?;
    article.training_frequency =
        fields.closed::<TrainingFrequency>("training-frequency", raw.training_frequency.as_ref())?;
    article.last_trained = fields.timestamp("last-trained", raw.last_trained.as_ref())?;
    article.km_id = fields.optional_text("km-id", raw.km_id.as_ref())?;
    article.km_last_sync = fields.timestamp("km-last-sync", raw.km_last_sync.as_ref())?;
    article.references = fields.references(raw.references.as_ref())?;
    article.software_version =
        fields.text_list("software-version", raw.software_version.as_ref())?;
    article.is_impacting = fields.flag("is-impacting", raw.is_impacting.as_ref())?;

    Ok(article)
}

/// Layout of a text field as seen by the first pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Scalar,
    List,
}

impl Shape {
    /// `None` when the value is absent or has a shape the field reader
    /// rejects anyway.
    fn of(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Sequence(items)
                if items.iter().all(|item| item.is_null() || is_plain_scalar(item)) =>
            {
                Some(Shape::List)
            }
            v if is_plain_scalar(v) => Some(Shape::Scalar),
            _ => None,
        }
    }
}

fn is_plain_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Text fields as spelled in the source, keyed by their YAML name. List
/// entries keep their position; nulls stay in place as `None`.
#[derive(Debug, Default)]
struct SourceText(HashMap<String, Vec<Option<String>>>);

impl SourceText {
    fn read(path: &Path, yaml: &str, raw: &RawArticle) -> Self {
        let shapes: HashMap<&'static str, Shape> = [
            ("id", Shape::of(raw.id.as_ref())),
            ("title", Shape::of(raw.title.as_ref())),
            ("technology", Shape::of(raw.technology.as_ref())),
            ("abstract", Shape::of(raw.summary.as_ref())),
            ("section", Shape::of(raw.section.as_ref())),
            ("km-id", Shape::of(raw.km_id.as_ref())),
            ("keywords", Shape::of(raw.keywords.as_ref())),
            ("author", Shape::of(raw.author.as_ref())),
            ("sme", Shape::of(raw.sme.as_ref())),
            ("software-version", Shape::of(raw.software_version.as_ref())),
        ]
        .into_iter()
        .filter_map(|(field, shape)| shape.map(|shape| (field, shape)))
        .collect();
        if shapes.is_empty() {
            return Self::default();
        }

        SourceSeed { shapes: &shapes }
            .deserialize(serde_yaml::Deserializer::from_str(yaml))
            .unwrap_or_else(|err| {
                debug!(
                    path = %path.display(),
                    error = %err,
                    "falling back to normalised field text"
                );
                Self::default()
            })
    }

    fn item(&self, field: &str, idx: usize) -> Option<String> {
        self.0.get(field)?.get(idx)?.clone()
    }
}

struct SourceSeed<'a> {
    shapes: &'a HashMap<&'static str, Shape>,
}

impl<'de> DeserializeSeed<'de> for SourceSeed<'_> {
    type Value = SourceText;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<SourceText, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for SourceSeed<'_> {
    type Value = SourceText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a metadata mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SourceText, A::Error> {
        let mut text = SourceText::default();
        while let Some(key) = map.next_key::<String>()? {
            let items = match self.shapes.get(key.as_str()) {
                Some(Shape::Scalar) => vec![map.next_value::<Option<String>>()?],
                Some(Shape::List) => map.next_value::<Vec<Option<String>>>()?,
                None => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            text.0.insert(key, items);
        }
        Ok(text)
    }
}

struct FieldReader<'a> {
    path: &'a Path,
    source: &'a SourceText,
}

impl FieldReader<'_> {
    fn invalid(&self, field: &str, value: &Value, expected: &str) -> DecodeError {
        DecodeError::invalid(self.path, field, describe(value), expected)
    }

    /// Source spelling of a scalar, falling back to the `Value` rendering.
    fn source_text(&self, field: &str, idx: usize, value: &Value) -> Option<String> {
        if !is_plain_scalar(value) {
            return scalar_text(value);
        }
        self.source.item(field, idx).or_else(|| scalar_text(value))
    }

    fn required_text(&self, field: &str, value: Option<&Value>) -> DecodeResult<String> {
        self.optional_text(field, value)?
            .ok_or_else(|| DecodeError::missing(self.path, field))
    }

    /// Scalar text; empty or whitespace-only values count as absent.
    fn optional_text(&self, field: &str, value: Option<&Value>) -> DecodeResult<Option<String>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => {
                let text = self
                    .source_text(field, 0, v)
                    .ok_or_else(|| self.invalid(field, v, "a scalar value"))?;
                Ok((!text.trim().is_empty()).then_some(text))
            }
        }
    }

    fn closed<T: ClosedSet>(&self, field: &str, value: Option<&Value>) -> DecodeResult<Option<T>> {
        let Some(text) = self.optional_text(field, value)? else {
            return Ok(None);
        };
        text.parse::<T>()
            .map(Some)
            .map_err(|err| DecodeError::invalid(self.path, field, err.value, T::expected()))
    }

    fn flag(&self, field: &str, value: Option<&Value>) -> DecodeResult<bool> {
        match value {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(v @ Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                _ => Err(self.invalid(field, v, "true or false")),
            },
            Some(v) => Err(self.invalid(field, v, "true or false")),
        }
    }

    fn order(&self, value: Option<&Value>) -> DecodeResult<Option<u16>> {
        const EXPECTED: &str = "a non-negative integer";
        let Some(text) = self.optional_text("order", value)? else {
            return Ok(None);
        };
        text.trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| DecodeError::invalid(self.path, "order", text, EXPECTED))
    }

    fn timestamp(
        &self,
        field: &str,
        value: Option<&Value>,
    ) -> DecodeResult<Option<chrono::NaiveDateTime>> {
        let Some(text) = self.optional_text(field, value)? else {
            return Ok(None);
        };
        parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| DecodeError::invalid(self.path, field, text, "a date (YYYY-MM-DD)"))
    }

    /// Accepts a single scalar or a sequence of scalars.
    fn text_list(&self, field: &str, value: Option<&Value>) -> DecodeResult<Vec<String>> {
        match value {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Sequence(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    if item.is_null() {
                        continue;
                    }
                    let text = self.source_text(field, idx, item).ok_or_else(|| {
                        self.invalid(&format!("{field}[{idx}]"), item, "a scalar value")
                    })?;
                    if !text.trim().is_empty() {
                        out.push(text);
                    }
                }
                Ok(out)
            }
            Some(v) => Ok(self.optional_text(field, Some(v))?.into_iter().collect()),
        }
    }

    /// A sequence of `title`/`link` mappings.
    fn references(&self, value: Option<&Value>) -> DecodeResult<Vec<ReferenceLink>> {
        const EXPECTED: &str = "a list of entries with a title and a link";
        let items = match value {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(items)) => items,
            Some(v) => return Err(self.invalid("references", v, EXPECTED)),
        };
        items
            .iter()
            .enumerate()
            .map(|(idx, reference)| {
                if !reference.is_mapping() {
                    return Err(self.invalid(
                        &format!("references[{idx}]"),
                        reference,
                        "a mapping with a title and a link",
                    ));
                }
                let title_field = format!("references[{idx}].title");
                let link_field = format!("references[{idx}].link");
                let title = self.required_text(&title_field, reference.get("title"))?;
                let link_text = self.required_text(&link_field, reference.get("link"))?;
                let link = Url::parse(link_text.trim()).map_err(|_| {
                    DecodeError::invalid(self.path, &link_field, &link_text, "an absolute URL")
                })?;
                Ok(ReferenceLink { title, link })
            })
            .collect()
    }
}

/// Textual form of a YAML scalar; `None` for sequences and mappings.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn describe(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| match value {
        Value::Sequence(_) => "<sequence>".into(),
        Value::Mapping(_) => "<mapping>".into(),
        _ => "<null>".into(),
    })
}

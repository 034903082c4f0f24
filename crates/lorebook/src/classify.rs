//! Type-tag probe that decides what happens to a document before it is
//! fully decoded.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{LorebookError, Result};
use crate::kinds::{DocumentType, SkipTag, normalize_token};

/// Outcome of probing a document's type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Decode the block in full as an article of this kind.
    Article(DocumentType),
    /// Recognised but not an article; leave the file alone.
    Skip(SkipTag),
}

/// Minimal record decoding nothing but the discriminant.
#[derive(Debug, Deserialize)]
struct TypeProbe {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
}

/// Classifies a metadata block by its `type` tag.
///
/// Fails with a classification error when the tag is missing, empty, or the
/// block cannot be read at all, and with an unknown-type error when the tag
/// names neither an article kind nor a known non-article category.
pub fn classify(path: &Path, yaml: &str) -> Result<Classification> {
    let probe: TypeProbe =
        serde_yaml::from_str(yaml).map_err(|err| LorebookError::Classification {
            path: path.to_path_buf(),
            message: format!("the metadata block could not be read: {err}"),
        })?;

    let tag = match probe.kind {
        Some(Value::String(tag)) => tag,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => {
            return Err(LorebookError::Classification {
                path: path.to_path_buf(),
                message: "the 'type' property is missing".into(),
            });
        }
        Some(_) => {
            return Err(LorebookError::Classification {
                path: path.to_path_buf(),
                message: "the 'type' property must be a single value".into(),
            });
        }
    };

    let token = normalize_token(&tag);
    if token.is_empty() {
        return Err(LorebookError::Classification {
            path: path.to_path_buf(),
            message: "the 'type' property is empty".into(),
        });
    }

    if let Ok(kind) = token.parse::<DocumentType>() {
        return Ok(Classification::Article(kind));
    }
    if let Ok(skip) = token.parse::<SkipTag>() {
        return Ok(Classification::Skip(skip));
    }
    Err(LorebookError::UnknownType {
        path: path.to_path_buf(),
        tag: token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(yaml: &str) -> Result<Classification> {
        classify(Path::new("docs/a.md"), yaml)
    }

    #[test]
    fn article_tags_ignore_case_and_spacing() {
        for tag in ["Getting Started", "gettingstarted", "GETTING STARTED"] {
            let yaml = format!("type: {tag}\ntitle: x\n");
            assert_eq!(
                probe(&yaml).unwrap(),
                Classification::Article(DocumentType::GettingStarted)
            );
        }
    }

    #[test]
    fn known_non_article_tags_are_skipped() {
        assert_eq!(probe("type: Plan\n").unwrap(), Classification::Skip(SkipTag::Plan));
        assert_eq!(probe("type: ' S T I G '\n").unwrap(), Classification::Skip(SkipTag::Stig));
        assert_eq!(probe("type: A025\n").unwrap(), Classification::Skip(SkipTag::A025));
    }

    #[test]
    fn unknown_tag_names_file_and_normalized_tag() {
        let err = probe("type: Widget\n").unwrap_err();
        match &err {
            LorebookError::UnknownType { path, tag } => {
                assert_eq!(path, Path::new("docs/a.md"));
                assert_eq!(tag, "widget");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("[widget]"));
    }

    #[test]
    fn missing_empty_or_malformed_tags_are_classification_errors() {
        for yaml in ["title: no type\n", "type: ''\n", "type:\n", "type: [a, b]\n", "type: [unclosed\n"] {
            assert!(
                matches!(probe(yaml), Err(LorebookError::Classification { .. })),
                "{yaml}"
            );
        }
    }
}

pub mod article;
pub mod authoring;
pub mod body;
pub mod classify;
pub mod config;
pub mod decode;
pub mod derived;
pub mod error;
pub mod front_matter;
pub mod ingest;
pub mod kinds;
pub mod library;
pub mod roster;
pub mod scanner;
pub mod serializer;
pub mod timestamp;

pub use article::{Article, Keywords, ReferenceLink, generate_id};
pub use authoring::{NewArticle, PLACEHOLDER_BODY, article_file_name, new_article};
pub use body::normalize_body;
pub use classify::{Classification, classify};
pub use config::{DEFAULT_EXTENSIONS, LibraryConfig};
pub use decode::decode_article;
pub use derived::{is_km_sync_required, is_training_required, local_now};
pub use error::{DecodeError, DecodeErrorKind, LorebookError, Result};
pub use front_matter::{FrontMatterSplit, split_front_matter};
pub use ingest::{Outcome, SkipReason, ingest, process_file};
pub use kinds::{Difficulty, DocumentType, Skillset, SkipTag, TrainingFrequency};
pub use library::{Library, TrainingReceipt};
pub use roster::{Contributor, DedupBasis, Roster, TrainingRecord, merge, roster_schema};
pub use scanner::{Scan, scan};
pub use serializer::{content_digest, encode_front_matter, render_document};
pub use timestamp::{format_timestamp, parse_date, parse_timestamp};

//! Contributor roster and the idempotent training merge.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveTime};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::article::Article;
use crate::error::{LorebookError, Result};
use crate::kinds::Skillset;
use crate::timestamp::date_list;

/// Which calendar day a repeated training event is deduplicated against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupBasis {
    /// Skip the append when the supplied training date is already recorded.
    #[default]
    TrainingDate,
    /// Skip the append when today's date is already recorded, regardless of
    /// the supplied date.
    Today,
}

/// Training history for one (article id, article title) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingRecord {
    pub article_title: String,
    #[serde(rename = "ArticleID")]
    pub article_id: String,
    #[serde(with = "date_list", default)]
    #[schemars(with = "Vec<String>")]
    pub training_dates: Vec<NaiveDate>,
}

impl TrainingRecord {
    fn matches(&self, article: &Article) -> bool {
        self.article_id == article.id && self.article_title == article.title
    }
}

/// Person who can author articles and attend training.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Contributor {
    pub sam_account_name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: Skillset,
    #[serde(default)]
    pub training_records: Vec<TrainingRecord>,
}

impl Contributor {
    pub fn new(sam_account_name: impl Into<String>) -> Self {
        Self {
            sam_account_name: sam_account_name.into(),
            surname: String::new(),
            given_name: String::new(),
            display_name: String::new(),
            role: Skillset::default(),
            training_records: Vec::new(),
        }
    }

    /// History for `article`, if the contributor has ever trained on it.
    pub fn training_for(&self, article: &Article) -> Option<&TrainingRecord> {
        self.training_records.iter().find(|r| r.matches(article))
    }

    /// Records a training event on `date`. See [`merge`].
    pub fn record_training(
        &mut self,
        article: &mut Article,
        date: NaiveDate,
        basis: DedupBasis,
    ) -> bool {
        merge(self, article, date, Local::now().date_naive(), basis)
    }

    /// Records a training event dated today.
    pub fn record_training_today(&mut self, article: &mut Article, basis: DedupBasis) -> bool {
        let today = Local::now().date_naive();
        merge(self, article, today, today, basis)
    }
}

/// Merges a training event into a contributor's history.
///
/// Creates a record seeded with `date` when the contributor has none for the
/// article. Otherwise appends `date` unless the day selected by `basis` is
/// already present. The article's `last-trained` is set to `date` either
/// way. Returns whether a date was appended.
pub fn merge(
    contributor: &mut Contributor,
    article: &mut Article,
    date: NaiveDate,
    today: NaiveDate,
    basis: DedupBasis,
) -> bool {
    let appended = match contributor
        .training_records
        .iter_mut()
        .find(|r| r.matches(article))
    {
        None => {
            contributor.training_records.push(TrainingRecord {
                article_title: article.title.clone(),
                article_id: article.id.clone(),
                training_dates: vec![date],
            });
            true
        }
        Some(record) => {
            let key = match basis {
                DedupBasis::TrainingDate => date,
                DedupBasis::Today => today,
            };
            if record.training_dates.contains(&key) {
                false
            } else {
                record.training_dates.push(date);
                true
            }
        }
    };
    article.last_trained = Some(date.and_time(NaiveTime::MIN));
    debug!(
        contributor = %contributor.sam_account_name,
        article = %article.id,
        %date,
        appended,
        "merged training event"
    );
    appended
}

/// The contributor list backed by a JSON file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    path: Option<PathBuf>,
    contributors: Vec<Contributor>,
}

impl Roster {
    pub fn new(contributors: Vec<Contributor>) -> Self {
        Self {
            path: None,
            contributors,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| LorebookError::io(path, err))?;
        let mut roster = Self::from_json(&raw).map_err(|err| err.context(path.display()))?;
        roster.path = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            contributors = roster.contributors.len(),
            "loaded roster"
        );
        Ok(roster)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    /// Pretty-printed JSON array of contributors.
    pub fn to_json(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&self.contributors)?;
        text.push('\n');
        Ok(text)
    }

    /// File the roster was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes back to the file the roster was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            LorebookError::configuration("the roster was not loaded from a file")
        })?;
        self.export(path)
    }

    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|err| LorebookError::io(path, err))?;
        debug!(path = %path.display(), "saved roster");
        Ok(())
    }

    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    /// Looks a contributor up by account name, ignoring case.
    pub fn find(&self, sam_account_name: &str) -> Option<&Contributor> {
        self.contributors
            .iter()
            .find(|c| c.sam_account_name.eq_ignore_ascii_case(sam_account_name))
    }

    pub fn find_mut(&mut self, sam_account_name: &str) -> Option<&mut Contributor> {
        self.contributors
            .iter_mut()
            .find(|c| c.sam_account_name.eq_ignore_ascii_case(sam_account_name))
    }

    pub fn push(&mut self, contributor: Contributor) {
        self.contributors.push(contributor);
    }
}

/// JSON Schema describing the roster file.
pub fn roster_schema() -> Schema {
    schema_for!(Vec<Contributor>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::DocumentType;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn article() -> Article {
        let mut article = Article::new("Rotate Keys", DocumentType::Modify, "Vault");
        article.id = "a-1".into();
        article
    }

    #[test]
    fn merging_twice_on_the_same_day_keeps_one_entry() {
        let mut contributor = Contributor::new("jdoe");
        let mut article = article();
        let today = ymd(2024, 5, 2);

        assert!(merge(&mut contributor, &mut article, today, today, DedupBasis::TrainingDate));
        assert!(!merge(&mut contributor, &mut article, today, today, DedupBasis::TrainingDate));
        assert!(!merge(&mut contributor, &mut article, today, today, DedupBasis::Today));

        let record = contributor.training_for(&article).unwrap();
        assert_eq!(record.training_dates, vec![today]);
        assert_eq!(article.last_trained, Some(today.and_time(NaiveTime::MIN)));
    }

    #[test]
    fn training_date_basis_blocks_backdated_repeats() {
        let mut contributor = Contributor::new("jdoe");
        let mut article = article();
        let past = ymd(2024, 1, 10);
        let today = ymd(2024, 5, 2);

        merge(&mut contributor, &mut article, past, today, DedupBasis::TrainingDate);
        assert!(!merge(&mut contributor, &mut article, past, today, DedupBasis::TrainingDate));
        assert_eq!(contributor.training_for(&article).unwrap().training_dates, vec![past]);
    }

    #[test]
    fn today_basis_allows_backdated_repeats_until_today_is_recorded() {
        let mut contributor = Contributor::new("jdoe");
        let mut article = article();
        let past = ymd(2024, 1, 10);
        let today = ymd(2024, 5, 2);

        merge(&mut contributor, &mut article, past, today, DedupBasis::Today);
        assert!(merge(&mut contributor, &mut article, past, today, DedupBasis::Today));
        assert!(merge(&mut contributor, &mut article, today, today, DedupBasis::Today));
        assert!(!merge(&mut contributor, &mut article, past, today, DedupBasis::Today));
        assert_eq!(
            contributor.training_for(&article).unwrap().training_dates,
            vec![past, past, today]
        );
        assert_eq!(article.last_trained, Some(past.and_time(NaiveTime::MIN)));
    }

    #[test]
    fn records_are_keyed_by_id_and_title() {
        let mut contributor = Contributor::new("jdoe");
        let mut article = article();
        let day = ymd(2024, 5, 2);
        merge(&mut contributor, &mut article, day, day, DedupBasis::TrainingDate);

        article.title = "Rotate Keys (v2)".into();
        merge(&mut contributor, &mut article, day, day, DedupBasis::TrainingDate);
        assert_eq!(contributor.training_records.len(), 2);
    }

    #[test]
    fn roster_json_uses_pascal_case_and_accepts_role_ordinals() {
        let raw = r#"[
            {
                "SamAccountName": "jdoe",
                "Surname": "Doe",
                "GivenName": "Jane",
                "DisplayName": "Jane Doe",
                "Role": 3,
                "TrainingRecords": [
                    {
                        "ArticleTitle": "Rotate Keys",
                        "ArticleID": "a-1",
                        "TrainingDates": ["2024-01-10T00:00:00", "2024-05-02"]
                    }
                ]
            },
            { "SamAccountName": "rroe", "Role": "architect" }
        ]"#;
        let roster = Roster::from_json(raw).unwrap();
        let jane = roster.find("JDOE").unwrap();
        assert_eq!(jane.role, Skillset::Engineer);
        assert_eq!(
            jane.training_records[0].training_dates,
            vec![ymd(2024, 1, 10), ymd(2024, 5, 2)]
        );
        assert_eq!(roster.find("rroe").unwrap().role, Skillset::Architect);

        let json = roster.to_json().unwrap();
        assert!(json.contains("\"ArticleID\": \"a-1\""), "{json}");
        assert!(json.contains("\"Role\": \"Engineer\""), "{json}");
        assert!(json.contains("\"2024-01-10\""), "{json}");
        assert_eq!(Roster::from_json(&json).unwrap().contributors(), roster.contributors());
    }

    #[test]
    fn malformed_roster_is_serialization_error() {
        let err = Roster::from_json("{ not json").unwrap_err();
        assert!(matches!(err, LorebookError::Serialization(_)));
    }

    #[test]
    fn load_and_save_round_trip_through_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("roster.json");
        fs::write(&path, r#"[{"SamAccountName": "jdoe"}]"#).unwrap();

        let mut roster = Roster::load(&path).unwrap();
        let mut article = article();
        roster
            .find_mut("jdoe")
            .unwrap()
            .record_training(&mut article, ymd(2024, 2, 1), DedupBasis::TrainingDate);
        roster.save().unwrap();

        let reloaded = Roster::load(&path).unwrap();
        assert_eq!(reloaded.contributors(), roster.contributors());
        assert_eq!(reloaded.path(), Some(path.as_path()));
    }

    #[test]
    fn schema_names_pascal_case_properties() {
        let schema = serde_json::to_string(&roster_schema()).unwrap();
        assert!(schema.contains("SamAccountName"));
        assert!(schema.contains("TrainingDates"));
    }
}

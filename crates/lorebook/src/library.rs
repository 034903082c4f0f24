//! Loaded corpus plus roster, the single-owner state callers work against
//! once ingestion has finished.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::article::Article;
use crate::config::LibraryConfig;
use crate::error::{LorebookError, Result};
use crate::ingest::ingest;
use crate::roster::{DedupBasis, Roster, merge};

#[derive(Debug)]
pub struct Library {
    config: LibraryConfig,
    articles: Vec<Article>,
    roster: Option<Roster>,
}

/// Result of recording a training event through the library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingReceipt {
    pub contributor: String,
    pub article_id: String,
    pub date: NaiveDate,
    pub appended: bool,
}

impl Library {
    /// Validates the configuration, ingests the corpus, and loads the roster
    /// when one is configured.
    pub fn open(config: LibraryConfig) -> Result<Self> {
        let articles = ingest(&config)?;
        let roster = config.roster().map(Roster::load).transpose()?;
        Ok(Self {
            config,
            articles,
            roster,
        })
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Articles in scan order.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    /// Finds an article by id, falling back to a case-insensitive title match.
    pub fn find_article(&self, key: &str) -> Option<&Article> {
        self.position(key).map(|idx| &self.articles[idx])
    }

    pub fn article_mut(&mut self, key: &str) -> Option<&mut Article> {
        self.position(key).map(move |idx| &mut self.articles[idx])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.articles
            .iter()
            .position(|a| a.id == key)
            .or_else(|| {
                self.articles
                    .iter()
                    .position(|a| a.title.eq_ignore_ascii_case(key.trim()))
            })
    }

    /// Articles that are training topics overdue for training at `now`.
    pub fn training_due(&self, now: NaiveDateTime) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.is_training_required(now))
            .collect()
    }

    /// Articles whose knowledge-base entry is overdue for sync at `now`.
    pub fn km_sync_due(&self, now: NaiveDateTime) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.is_km_sync_required(now))
            .collect()
    }

    /// Articles whose file differs from their canonical rendering.
    pub fn non_canonical(&self) -> Result<Vec<&Article>> {
        let mut out = Vec::new();
        for article in &self.articles {
            if !article.is_canonical()? {
                out.push(article);
            }
        }
        Ok(out)
    }

    /// Rewrites every non-canonical article. Returns how many files changed.
    pub fn save_all(&mut self) -> Result<usize> {
        let mut written = 0;
        for article in &mut self.articles {
            if !article.is_canonical()? {
                article.save()?;
                written += 1;
            }
        }
        info!(written, total = self.articles.len(), "saved articles");
        Ok(written)
    }

    /// Merges a training event for `contributor` on `article_key`, then
    /// saves the roster and the article, in that order. A failed roster save
    /// leaves the article file untouched.
    pub fn record_training(
        &mut self,
        contributor: &str,
        article_key: &str,
        date: NaiveDate,
        today: NaiveDate,
        basis: DedupBasis,
    ) -> Result<TrainingReceipt> {
        let idx = self.position(article_key).ok_or_else(|| {
            LorebookError::configuration(format!("no article matches '{article_key}'"))
        })?;
        let roster = self
            .roster
            .as_mut()
            .ok_or_else(|| LorebookError::configuration("no roster file is configured"))?;
        let person = roster.find_mut(contributor).ok_or_else(|| {
            LorebookError::configuration(format!("no contributor named '{contributor}'"))
        })?;

        let article = &mut self.articles[idx];
        let appended = merge(person, article, date, today, basis);
        let receipt = TrainingReceipt {
            contributor: person.sam_account_name.clone(),
            article_id: article.id.clone(),
            date,
            appended,
        };
        roster.save()?;
        article.save()?;
        info!(
            contributor = %receipt.contributor,
            article = %receipt.article_id,
            appended,
            "recorded training"
        );
        Ok(receipt)
    }
}

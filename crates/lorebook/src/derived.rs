//! Time-dependent flags derived from article metadata.
//!
//! These are never stored or decoded; they are recomputed against the `now`
//! the caller passes in.

use chrono::{Local, Months, NaiveDateTime};

use crate::article::Article;

const KM_SYNC_WINDOW: Months = Months::new(12);

/// Current local wall-clock time, the `now` used outside of tests.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// True when the article is linked to a knowledge-base entry whose last sync
/// is more than a year before `now`.
pub fn is_km_sync_required(article: &Article, now: NaiveDateTime) -> bool {
    let linked = article
        .km_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    match (linked, article.km_last_sync, now.checked_sub_months(KM_SYNC_WINDOW)) {
        (true, Some(last_sync), Some(cutoff)) => last_sync < cutoff,
        _ => false,
    }
}

/// True when the article is a training topic with a frequency and its last
/// training falls outside the frequency's window. A topic that was never
/// trained is always due.
pub fn is_training_required(article: &Article, now: NaiveDateTime) -> bool {
    if !article.is_training_topic {
        return false;
    }
    let Some(frequency) = article.training_frequency else {
        return false;
    };
    let Some(cutoff) = frequency.cutoff(now) else {
        return false;
    };
    match article.last_trained {
        Some(last_trained) => last_trained < cutoff,
        None => true,
    }
}

impl Article {
    pub fn is_km_sync_required(&self, now: NaiveDateTime) -> bool {
        is_km_sync_required(self, now)
    }

    pub fn is_training_required(&self, now: NaiveDateTime) -> bool {
        is_training_required(self, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{DocumentType, TrainingFrequency};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn training_article(frequency: Option<TrainingFrequency>, last: Option<NaiveDateTime>) -> Article {
        let mut article = Article::new("Topic", DocumentType::Standard, "Storage");
        article.is_training_topic = true;
        article.training_frequency = frequency;
        article.last_trained = last;
        article
    }

    #[test]
    fn quarterly_topic_trained_four_months_ago_is_due() {
        let now = at(2024, 6, 15);
        let due = training_article(Some(TrainingFrequency::Quarterly), Some(at(2024, 2, 15)));
        let fresh = training_article(Some(TrainingFrequency::Quarterly), Some(at(2024, 4, 15)));
        assert!(due.is_training_required(now));
        assert!(!fresh.is_training_required(now));
    }

    #[test]
    fn windows_follow_frequency_table() {
        let now = at(2024, 6, 15);
        let seven_months = Some(at(2023, 11, 15));
        assert!(training_article(Some(TrainingFrequency::SemiAnnually), seven_months).is_training_required(now));
        assert!(!training_article(Some(TrainingFrequency::Yearly), seven_months).is_training_required(now));
        assert!(training_article(Some(TrainingFrequency::Yearly), Some(at(2023, 6, 1))).is_training_required(now));
    }

    #[test]
    fn absent_frequency_or_non_topic_is_never_due() {
        let now = at(2024, 6, 15);
        let ancient = Some(at(2001, 1, 1));
        assert!(!training_article(None, ancient).is_training_required(now));

        let mut not_topic = training_article(Some(TrainingFrequency::Quarterly), ancient);
        not_topic.is_training_topic = false;
        assert!(!not_topic.is_training_required(now));
    }

    #[test]
    fn never_trained_topic_is_due() {
        let now = at(2024, 6, 15);
        assert!(training_article(Some(TrainingFrequency::Yearly), None).is_training_required(now));
    }

    #[test]
    fn km_sync_requires_id_and_stale_sync() {
        let now = at(2024, 6, 15);
        let mut article = Article::new("Topic", DocumentType::Standard, "Storage");
        article.km_last_sync = Some(at(2023, 3, 23));
        assert!(!article.is_km_sync_required(now), "no km-id");

        article.km_id = Some("KM123456".into());
        assert!(article.is_km_sync_required(now));

        article.km_last_sync = Some(at(2023, 9, 1));
        assert!(!article.is_km_sync_required(now), "synced within a year");

        article.km_last_sync = None;
        assert!(!article.is_km_sync_required(now), "never synced");
    }
}

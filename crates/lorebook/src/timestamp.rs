//! Parsing and canonical rendering of metadata timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Parses any accepted timestamp spelling. Offsets are dropped after
/// converting to the local wall-clock value they name.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parses a calendar date, accepting a full timestamp and truncating it.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date())
}

/// Canonical form: bare date at midnight, otherwise seconds precision.
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Serde adapter for lists of training dates in the roster file.
pub(crate) mod date_list {
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dates: &[NaiveDate], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(dates.iter().map(|d| d.format("%Y-%m-%d").to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveDate>, D::Error> {
        let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        raw.iter()
            .map(|value| {
                super::parse_date(value)
                    .ok_or_else(|| D::Error::custom(format!("invalid training date '{value}'")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_iso_us_and_datetime_spellings() {
        let midnight = ymd(2023, 3, 23).and_time(NaiveTime::MIN);
        assert_eq!(parse_timestamp("2023-03-23"), Some(midnight));
        assert_eq!(parse_timestamp("03/23/2023"), Some(midnight));
        assert_eq!(parse_timestamp("2023-03-23T00:00:00"), Some(midnight));
        assert_eq!(
            parse_timestamp("2023-03-23T08:15:00Z").map(|dt| dt.date()),
            Some(ymd(2023, 3, 23))
        );
        assert_eq!(parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn canonical_form_drops_midnight_time() {
        let midnight = ymd(2022, 1, 5).and_time(NaiveTime::MIN);
        assert_eq!(format_timestamp(&midnight), "2022-01-05");

        let morning = ymd(2022, 1, 5).and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(format_timestamp(&morning), "2022-01-05T09:30:00");
        assert_eq!(parse_timestamp(&format_timestamp(&morning)), Some(morning));
    }
}

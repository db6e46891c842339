use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::db::models::{Category, RecommendationSource};

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_usize(value: i64, field: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// Fixed-width RFC 3339 so that lexical comparison in SQL matches time order.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_category(value: &str) -> Result<Category> {
    match value {
        "Normal" => Ok(Category::Normal),
        "Borderline" => Ok(Category::Borderline),
        "Abnormal" => Ok(Category::Abnormal),
        other => Err(anyhow!("unknown reading category {other}")),
    }
}

pub fn parse_source(value: &str) -> Result<RecommendationSource> {
    match value {
        "AI" => Ok(RecommendationSource::Ai),
        "Specialist" => Ok(RecommendationSource::Specialist),
        other => Err(anyhow!("unknown recommendation source {other}")),
    }
}

/// Wrap a decoding failure so it can be returned from a rusqlite row mapper.
pub fn conversion_error(err: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        err.to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_datetimes_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(format_datetime(&earlier) < format_datetime(&later));
        assert_eq!(format_datetime(&later), "2024-01-10T00:00:00.000Z");
    }

    #[test]
    fn datetime_round_trips_through_text() {
        let value = Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
        let parsed = parse_datetime(&format_datetime(&value), "measured_at").unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(parse_category("High").is_err());
        assert!(parse_source("System").is_err());
        assert_eq!(parse_source("AI").unwrap(), RecommendationSource::Ai);
    }
}

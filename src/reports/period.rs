use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::reports::ReportError;

/// Calendar span covered by a report, both bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPeriod {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    /// A whole month when `month` is given, otherwise the whole year.
    /// A month of 0 is read as "no month", as the dashboard sends it.
    pub fn from_request(year: i32, month: Option<u32>) -> Result<Self, ReportError> {
        let month = month.filter(|&m| m != 0);
        if !(1970..=9999).contains(&year) {
            return Err(ReportError::Validation(format!("year {year} is out of range")));
        }

        let (first_day, next_first_day, label) = match month {
            Some(month) => {
                if !(1..=12).contains(&month) {
                    return Err(ReportError::Validation(format!(
                        "month must be between 1 and 12, got {month}"
                    )));
                }
                let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
                (
                    ymd(year, month)?,
                    ymd(next_year, next_month)?,
                    format!("{year}-{month:02}"),
                )
            }
            None => (ymd(year, 1)?, ymd(year + 1, 1)?, format!("{year}-All")),
        };

        let start = Utc.from_utc_datetime(&first_day.and_time(chrono::NaiveTime::MIN));
        // Last representable millisecond of the period; timestamps are stored at millisecond precision.
        let end = Utc.from_utc_datetime(&next_first_day.and_time(chrono::NaiveTime::MIN))
            - Duration::milliseconds(1);

        Ok(Self { label, start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

fn ymd(year: i32, month: u32) -> Result<NaiveDate, ReportError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ReportError::Validation(format!("invalid date {year}-{month}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_covers_every_day_inclusive() {
        let period = ReportPeriod::from_request(2024, Some(2)).unwrap();
        assert_eq!(period.label, "2024-02");
        assert_eq!(period.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let period = ReportPeriod::from_request(2023, Some(12)).unwrap();
        assert!(period.contains(Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap()));
        assert_eq!(period.end + Duration::milliseconds(1), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn whole_year_without_month() {
        let period = ReportPeriod::from_request(2024, None).unwrap();
        assert_eq!(period.label, "2024-All");
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap()));
    }

    #[test]
    fn zero_month_means_whole_year() {
        let period = ReportPeriod::from_request(2024, Some(0)).unwrap();
        assert_eq!(period, ReportPeriod::from_request(2024, None).unwrap());
        assert_eq!(period.label, "2024-All");
    }

    #[test]
    fn rejects_bad_month_and_year() {
        assert!(matches!(
            ReportPeriod::from_request(2024, Some(13)),
            Err(ReportError::Validation(_))
        ));
        assert!(ReportPeriod::from_request(12, None).is_err());
    }
}

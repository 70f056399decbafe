//! Submission rules and the day-count policy for new leave requests.

use std::{fmt, str::FromStr};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{
    error::LedgerError,
    models::{date_range::DateRange, leave_request::CreateLeaveRequest},
};

/// Which dates of a request's range count against the balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCountPolicy {
    /// Every date in the inclusive range.
    #[default]
    CalendarDays,
    /// Monday to Friday only.
    Weekdays,
}

impl DayCountPolicy {
    pub fn count_days(self, range: &DateRange) -> i64 {
        match self {
            DayCountPolicy::CalendarDays => range.len_days(),
            DayCountPolicy::Weekdays => weekdays_in(range),
        }
    }
}

/// Monday-to-Friday dates in `range`, counted per whole week.
fn weekdays_in(range: &DateRange) -> i64 {
    let total = range.len_days();
    let first = i64::from(range.start().weekday().num_days_from_monday());
    let remainder = (0..total % 7)
        .filter(|offset| (first + offset) % 7 < 5)
        .count() as i64;
    total / 7 * 5 + remainder
}

impl fmt::Display for DayCountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayCountPolicy::CalendarDays => write!(f, "calendar_days"),
            DayCountPolicy::Weekdays => write!(f, "weekdays"),
        }
    }
}

impl FromStr for DayCountPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "calendar_days" | "calendar" => Ok(DayCountPolicy::CalendarDays),
            "weekdays" | "business_days" => Ok(DayCountPolicy::Weekdays),
            other => Err(format!("unknown day count policy: {other}")),
        }
    }
}

/// Checks a submission and returns the number of days it will consume.
///
/// Balance availability is not checked here; the debit happens at approval.
pub fn days_for_submission(
    payload: &CreateLeaveRequest,
    policy: DayCountPolicy,
) -> Result<i32, LedgerError> {
    let range = DateRange::new(payload.start_date, payload.end_date)?;
    let days = policy.count_days(&range);
    if days <= 0 {
        return Err(LedgerError::InvalidRequest(format!(
            "{} to {} contains no countable leave days",
            payload.start_date, payload.end_date
        )));
    }
    i32::try_from(days)
        .map_err(|_| LedgerError::InvalidRequest(format!("{days} days exceeds the supported range")))
}

/// Blank reasons are stored as absent.
pub fn normalize_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmployeeId, TeamId};
    use chrono::NaiveDate;

    fn payload(start: (i32, u32, u32), end: (i32, u32, u32)) -> CreateLeaveRequest {
        CreateLeaveRequest {
            employee_id: EmployeeId::new(),
            team_id: TeamId::new(),
            leave_type_id: "annual".into(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            reason: None,
        }
    }

    #[test]
    fn calendar_days_count_every_date_inclusively() {
        // Friday to Monday
        let days = days_for_submission(
            &payload((2026, 5, 8), (2026, 5, 11)),
            DayCountPolicy::CalendarDays,
        )
        .unwrap();
        assert_eq!(days, 4);
    }

    #[test]
    fn weekdays_skip_the_weekend() {
        let days =
            days_for_submission(&payload((2026, 5, 8), (2026, 5, 11)), DayCountPolicy::Weekdays)
                .unwrap();
        assert_eq!(days, 2);
    }

    #[test]
    fn weekday_count_matches_walking_every_date() {
        use chrono::Weekday;

        let start = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        for start_offset in 0..7 {
            let first = start + chrono::Duration::days(start_offset);
            for length in 0..30 {
                let range =
                    DateRange::new(first, first + chrono::Duration::days(length)).unwrap();
                let walked = range
                    .iter_days()
                    .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
                    .count() as i64;
                assert_eq!(DayCountPolicy::Weekdays.count_days(&range), walked);
            }
        }
    }

    #[test]
    fn huge_ranges_are_counted_without_walking_them() {
        let range = DateRange::new(NaiveDate::MIN, NaiveDate::MAX).unwrap();
        let weekdays = DayCountPolicy::Weekdays.count_days(&range);
        let calendar = DayCountPolicy::CalendarDays.count_days(&range);
        assert!(weekdays > calendar / 7 * 5 - 1 && weekdays <= calendar);

        let days = days_for_submission(
            &CreateLeaveRequest {
                start_date: NaiveDate::MIN,
                end_date: NaiveDate::MAX,
                ..payload((2026, 5, 8), (2026, 5, 8))
            },
            DayCountPolicy::Weekdays,
        )
        .unwrap();
        assert_eq!(i64::from(days), weekdays);
    }

    #[test]
    fn weekend_only_request_is_rejected_under_weekdays() {
        let err =
            days_for_submission(&payload((2026, 5, 9), (2026, 5, 10)), DayCountPolicy::Weekdays)
                .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let err = days_for_submission(
            &payload((2026, 5, 11), (2026, 5, 8)),
            DayCountPolicy::CalendarDays,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
    }

    #[test]
    fn policy_parses_config_values() {
        assert_eq!("weekdays".parse(), Ok(DayCountPolicy::Weekdays));
        assert_eq!(" Calendar_Days ".parse(), Ok(DayCountPolicy::CalendarDays));
        assert!("fortnights".parse::<DayCountPolicy>().is_err());
    }

    #[test]
    fn blank_reason_becomes_none() {
        assert_eq!(normalize_reason(Some("   ".into())), None);
        assert_eq!(normalize_reason(Some(" trip ".into())), Some("trip".into()));
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Today's date in the configured timezone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    local_date(tz, Utc::now())
}

/// Calendar date of `instant` as seen in `tz`.
pub fn local_date(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_date_follows_the_timezone() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap();
        assert_eq!(
            local_date(&chrono_tz::UTC, instant),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
        );
        assert_eq!(
            local_date(&chrono_tz::Asia::Tokyo, instant),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
        );
    }
}

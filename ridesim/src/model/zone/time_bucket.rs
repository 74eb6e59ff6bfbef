use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// time-of-day buckets used to pick a modifier from a zone's weight table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    RushHour,
    OffPeak,
    Weekend,
    Regular,
}

impl TimeBucket {
    /// weekend beats everything; rush hour is 07:00-08:59 and 16:00-18:59;
    /// off-peak is 22:00-04:59; the rest is regular hours
    pub fn from_datetime(datetime: &DateTime<Utc>) -> TimeBucket {
        if matches!(datetime.weekday(), Weekday::Sat | Weekday::Sun) {
            return TimeBucket::Weekend;
        }
        match datetime.hour() {
            7..=8 | 16..=18 => TimeBucket::RushHour,
            22..=23 | 0..=4 => TimeBucket::OffPeak,
            _ => TimeBucket::Regular,
        }
    }

    pub fn is_morning(datetime: &DateTime<Utc>) -> bool {
        datetime.hour() < 12
    }
}

#[cfg(test)]
mod test {
    use super::TimeBucket;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bucket_selection() {
        // 2026-08-17 is a monday
        let rush = Utc.with_ymd_and_hms(2026, 8, 17, 8, 30, 0).unwrap();
        let evening_rush = Utc.with_ymd_and_hms(2026, 8, 17, 17, 0, 0).unwrap();
        let off_peak = Utc.with_ymd_and_hms(2026, 8, 17, 23, 15, 0).unwrap();
        let regular = Utc.with_ymd_and_hms(2026, 8, 17, 12, 0, 0).unwrap();
        let weekend = Utc.with_ymd_and_hms(2026, 8, 22, 8, 30, 0).unwrap();

        assert_eq!(TimeBucket::from_datetime(&rush), TimeBucket::RushHour);
        assert_eq!(
            TimeBucket::from_datetime(&evening_rush),
            TimeBucket::RushHour
        );
        assert_eq!(TimeBucket::from_datetime(&off_peak), TimeBucket::OffPeak);
        assert_eq!(TimeBucket::from_datetime(&regular), TimeBucket::Regular);
        // saturday morning rush hour is still the weekend
        assert_eq!(TimeBucket::from_datetime(&weekend), TimeBucket::Weekend);
    }
}

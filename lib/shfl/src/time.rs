//! Host timestamps: signed nanoseconds since 1970-01-01 UTC.

/// Nanoseconds per second
const NS_PER_SEC: i64 = 1_000_000_000;

/// Seconds per day
const SECS_PER_DAY: i64 = 86_400;

/// Host timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeSpec(pub i64);

/// Broken-down calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplodedTime {
    pub year: i32,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
}

impl TimeSpec {
    pub fn from_secs(secs: i64) -> Self {
        TimeSpec(secs.saturating_mul(NS_PER_SEC))
    }

    /// Timestamp for a UTC calendar date and time
    pub fn from_civil(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let days = days_from_civil(year, month, day);
        let secs = days * SECS_PER_DAY + hour as i64 * 3600 + minute as i64 * 60 + second as i64;
        Self::from_secs(secs)
    }

    pub fn add_seconds(self, secs: i64) -> Self {
        TimeSpec(self.0.saturating_add(secs.saturating_mul(NS_PER_SEC)))
    }

    /// Break the timestamp down into calendar fields
    pub fn explode(self) -> ExplodedTime {
        let secs = self.0.div_euclid(NS_PER_SEC);
        let nanos = self.0.rem_euclid(NS_PER_SEC) as u32;
        let days = secs.div_euclid(SECS_PER_DAY);
        let tod = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        ExplodedTime {
            year,
            month,
            day,
            hour: (tod / 3600) as u8,
            minute: (tod % 3600 / 60) as u8,
            second: (tod % 60) as u8,
            nanosecond: nanos,
        }
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = year as i64 - if month <= 2 { 1 } else { 0 };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Proleptic Gregorian date for days since 1970-01-01
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year as i32, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        let t = TimeSpec(0).explode();
        assert_eq!((t.year, t.month, t.day), (1970, 1, 1));
        assert_eq!((t.hour, t.minute, t.second), (0, 0, 0));
    }

    #[test]
    fn test_known_date() {
        // 2020-01-15 12:34:56 UTC
        let t = TimeSpec::from_secs(1_579_091_696).explode();
        assert_eq!((t.year, t.month, t.day), (2020, 1, 15));
        assert_eq!((t.hour, t.minute, t.second), (12, 34, 56));
        assert_eq!(TimeSpec::from_civil(2020, 1, 15, 12, 34, 56), TimeSpec::from_secs(1_579_091_696));
    }

    #[test]
    fn test_leap_day_and_negative() {
        let t = TimeSpec::from_civil(2000, 2, 29, 0, 0, 0).explode();
        assert_eq!((t.year, t.month, t.day), (2000, 2, 29));

        let t = TimeSpec(-1).explode();
        assert_eq!((t.year, t.month, t.day), (1969, 12, 31));
        assert_eq!((t.hour, t.minute, t.second), (23, 59, 59));
    }

    #[test]
    fn test_add_seconds() {
        let t = TimeSpec::from_civil(2021, 12, 31, 23, 30, 0).add_seconds(3600).explode();
        assert_eq!((t.year, t.month, t.day, t.hour), (2022, 1, 1, 0));
    }
}

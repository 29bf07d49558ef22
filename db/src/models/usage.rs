use chrono::NaiveDate;
use serde::Serialize;

/// Daily usage counter stored on the profile row.
///
/// `count` only describes actions taken on `last_reset_date`. Reads on any
/// other day see a logical count of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct UsageCounter {
    #[sqlx(rename = "daily_usage_count")]
    pub count: i32,
    #[sqlx(rename = "last_usage_date")]
    pub last_reset_date: Option<NaiveDate>,
}

impl UsageCounter {
    pub fn new(count: i32, last_reset_date: NaiveDate) -> Self {
        UsageCounter {
            count,
            last_reset_date: Some(last_reset_date),
        }
    }

    /// Count that applies on `today`.
    pub fn logical_count(&self, today: NaiveDate) -> i32 {
        if self.last_reset_date == Some(today) {
            self.count.max(0)
        } else {
            0
        }
    }

    pub fn remaining(&self, today: NaiveDate, limit: u32) -> u32 {
        let used = self.logical_count(today) as u32;
        limit.saturating_sub(used)
    }

    /// The counter after one more action on `today`, or `None` when the
    /// limit is already reached.
    pub fn try_increment(&self, today: NaiveDate, limit: u32) -> Option<UsageCounter> {
        let current = self.logical_count(today);
        if current as u32 >= limit {
            return None;
        }
        Some(UsageCounter::new(current + 1, today))
    }
}

impl Default for UsageCounter {
    fn default() -> Self {
        UsageCounter {
            count: 0,
            last_reset_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn stale_day_counts_as_zero() {
        let counter = UsageCounter::new(50, day(1));
        assert_eq!(counter.logical_count(day(2)), 0);
        assert_eq!(counter.remaining(day(2), 50), 50);
    }

    #[test]
    fn increment_below_limit_moves_to_today() {
        let counter = UsageCounter::new(49, day(2));
        assert_eq!(counter.try_increment(day(2), 50), Some(UsageCounter::new(50, day(2))));
    }

    #[test]
    fn increment_at_limit_is_refused() {
        let counter = UsageCounter::new(50, day(2));
        assert_eq!(counter.try_increment(day(2), 50), None);
        assert_eq!(counter.remaining(day(2), 50), 0);
    }

    #[test]
    fn rollover_resets_before_the_limit_check() {
        let counter = UsageCounter::new(50, day(1));
        assert_eq!(counter.try_increment(day(2), 50), Some(UsageCounter::new(1, day(2))));
    }

    #[test]
    fn never_used_profile_starts_at_one() {
        assert_eq!(
            UsageCounter::default().try_increment(day(2), 50),
            Some(UsageCounter::new(1, day(2)))
        );
    }
}

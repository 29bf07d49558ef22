use std::{num::NonZeroU32, sync::Arc};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use common::{
    error::{AppError, Res},
    jwt::AuthUser,
};
use db::{models::usage::UsageCounter, usage::UsageStore};
use serde::Serialize;

/// The calendar day a usage event belongs to. Always UTC.
pub fn usage_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// When the counter for `now`'s day stops applying.
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = usage_day(now) + Days::new(1);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStatus {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub resets_at: DateTime<Utc>,
}

/// Caps analysis actions per user per UTC day.
pub struct DailyUsageLimiter {
    store: Arc<dyn UsageStore>,
    limit: NonZeroU32,
}

impl DailyUsageLimiter {
    pub fn new(store: Arc<dyn UsageStore>, limit: NonZeroU32) -> Self {
        Self { store, limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit.get()
    }

    /// Records one analysis action for `identity` on `today`.
    ///
    /// `Ok` carries the counter after the increment. Every other outcome is
    /// an error with a user-facing message and leaves the counter untouched.
    pub async fn check_and_increment(
        &self,
        identity: Option<&AuthUser>,
        today: NaiveDate,
    ) -> Res<UsageCounter> {
        let user = identity.ok_or_else(|| {
            AppError::Unauthorized("Please sign in to upload documents".to_string())
        })?;

        match self.store.try_consume(user.id, today, self.limit()).await {
            Ok(Some(counter)) => {
                log::debug!(
                    "Usage recorded for user {}: {}/{} on {}",
                    user.id,
                    counter.count,
                    self.limit(),
                    today
                );
                Ok(counter)
            }
            Ok(None) => {
                log::info!("Daily limit reached for user {} on {}", user.id, today);
                Err(AppError::TooManyRequests(format!(
                    "Daily limit reached. To ensure quality for all users, we limit analysis to {} tenders/day under our Fair Usage Policy.",
                    self.limit()
                )))
            }
            Err(e) => {
                log::error!("Failed to record usage for user {}: {}", user.id, e);
                Err(AppError::Store(
                    "Unable to verify usage limits. Please try again.".to_string(),
                ))
            }
        }
    }

    /// Today's usage without consuming anything.
    pub async fn status(&self, user: &AuthUser, now: DateTime<Utc>) -> Res<UsageStatus> {
        let today = usage_day(now);
        let counter = self
            .store
            .counter(user.id)
            .await
            .map_err(|e| {
                log::error!("Failed to read usage for user {}: {}", user.id, e);
                AppError::Store("Unable to load usage. Please try again.".to_string())
            })?
            .unwrap_or_default();

        Ok(UsageStatus {
            count: counter.logical_count(today) as u32,
            limit: self.limit(),
            remaining: counter.remaining(today, self.limit()),
            resets_at: next_reset(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn usage_day_is_the_utc_date() {
        // 23:30 UTC is already the next day in IST; the limiter must not care.
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(usage_day(now), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn next_reset_is_the_following_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 8, 0, 0).unwrap();
        assert_eq!(next_reset(now), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}

//! Runs the Postgres queries against a real database.
//!
//! Needs `DATABASE_URL`; every test returns early when it is unset. Each test
//! works on fresh random user ids, so the suite can share one database.

use std::sync::Arc;

use chrono::{Days, Months, NaiveDate, SubsecRound, Utc};
use db::{
    dtos::{profile::ProfileUpdateRequest, subscription::SubscriptionActivation},
    models::{
        subscription::{Plan, SubscriptionStatus},
        usage::UsageCounter,
    },
    profile::upsert_profile,
    subscription::{get_subscription_by_user_id, upsert_active_subscription},
    usage::{consume_daily_usage, get_usage_counter},
};
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> Option<Arc<PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };
    Some(db::setup(&url, false).await.unwrap())
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
}

async fn seed_counter(pool: &PgPool, user_id: Uuid, count: i32, day: NaiveDate) {
    sqlx::query("INSERT INTO profiles (id, daily_usage_count, last_usage_date) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(count)
        .bind(day)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn increment_below_the_ceiling_returns_the_new_count() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();
    seed_counter(&pool, user_id, 49, today()).await;

    let counter = consume_daily_usage(&*pool, user_id, today(), 50).await.unwrap();

    assert_eq!(counter, Some(UsageCounter::new(50, today())));
}

#[tokio::test]
async fn consume_at_the_ceiling_is_refused_without_a_write() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();
    seed_counter(&pool, user_id, 50, today()).await;

    let counter = consume_daily_usage(&*pool, user_id, today(), 50).await.unwrap();

    assert_eq!(counter, None);
    assert_eq!(
        get_usage_counter(&*pool, user_id).await.unwrap(),
        Some(UsageCounter::new(50, today()))
    );
}

#[tokio::test]
async fn first_consume_on_a_new_day_resets_to_one() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();
    let yesterday = today() - Days::new(1);
    seed_counter(&pool, user_id, 50, yesterday).await;

    let counter = consume_daily_usage(&*pool, user_id, today(), 50).await.unwrap();

    assert_eq!(counter, Some(UsageCounter::new(1, today())));
}

#[tokio::test]
async fn missing_profile_row_is_created_with_one() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();

    let counter = consume_daily_usage(&*pool, user_id, today(), 50).await.unwrap();

    assert_eq!(counter, Some(UsageCounter::new(1, today())));
    assert_eq!(
        get_usage_counter(&*pool, user_id).await.unwrap(),
        Some(UsageCounter::new(1, today()))
    );
}

#[tokio::test]
async fn concurrent_consumes_never_pass_the_ceiling() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();
    seed_counter(&pool, user_id, 45, today()).await;

    let attempts: Vec<_> = (0..20)
        .map(|_| {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { consume_daily_usage(&*pool, user_id, today(), 50).await })
        })
        .collect();

    let mut granted = 0;
    for attempt in attempts {
        if attempt.await.unwrap().unwrap().is_some() {
            granted += 1;
        }
    }

    assert_eq!(granted, 5);
    assert_eq!(
        get_usage_counter(&*pool, user_id).await.unwrap(),
        Some(UsageCounter::new(50, today()))
    );
}

#[tokio::test]
async fn profile_update_leaves_the_usage_counter_alone() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();
    seed_counter(&pool, user_id, 7, today()).await;

    let profile = upsert_profile(
        &*pool,
        user_id,
        ProfileUpdateRequest {
            company_name: Some("ACME Infra".to_string()),
            legal_status: Some("Private Limited".to_string()),
            has_gst: Some(true),
            gst_number: Some("27AAPFU0939F1ZV".to_string()),
            solvency_cert_value: Some(5_000_000.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(profile.company_name.as_deref(), Some("ACME Infra"));
    assert_eq!(profile.has_gst, Some(true));
    assert_eq!(profile.solvency_cert_value, Some(5_000_000.0));
    assert_eq!(profile.daily_usage_count, 7);
    assert_eq!(profile.last_usage_date, Some(today()));
}

fn activation(user_id: Uuid, payment_id: &str, plan: Plan) -> SubscriptionActivation {
    let started_at = Utc::now().trunc_subsecs(0);
    SubscriptionActivation {
        user_id,
        plan,
        amount: 999,
        currency: "INR".to_string(),
        razorpay_order_id: format!("order_{payment_id}"),
        razorpay_payment_id: payment_id.to_string(),
        razorpay_signature: "sig".to_string(),
        started_at,
        expires_at: started_at + Months::new(1),
    }
}

#[tokio::test]
async fn repeated_activation_keeps_one_row_per_user() {
    let Some(pool) = pool().await else { return };
    let user_id = Uuid::new_v4();

    let first = upsert_active_subscription(&*pool, activation(user_id, "pay_1", Plan::Starter))
        .await
        .unwrap();
    let second_activation = activation(user_id, "pay_2", Plan::BusinessPro);
    let expires_at = second_activation.expires_at;
    let second = upsert_active_subscription(&*pool, second_activation).await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&*pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(first.id, second.id);

    let stored = get_subscription_by_user_id(&*pool, user_id).await.unwrap().unwrap();
    assert_eq!(stored.plan, Plan::BusinessPro);
    assert_eq!(stored.status, SubscriptionStatus::Active);
    assert_eq!(stored.razorpay_payment_id.as_deref(), Some("pay_2"));
    assert_eq!(stored.amount, Some(999));
    assert_eq!(stored.expires_at, Some(expires_at));
}

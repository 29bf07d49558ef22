//! In-process stores with the same semantics as the Postgres ones.
//! Used by tests and local tooling that run without a database.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::error::{AppError, Res};
use uuid::Uuid;

use crate::{
    dtos::subscription::SubscriptionActivation,
    models::{
        subscription::{Subscription, SubscriptionStatus},
        usage::UsageCounter,
    },
    subscription::SubscriptionStore,
    usage::UsageStore,
};

fn lock<T>(mutex: &Mutex<T>) -> Res<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("In-memory store lock poisoned".to_string()))
}

#[derive(Default)]
pub struct MemoryUsageStore {
    counters: Mutex<HashMap<Uuid, UsageCounter>>,
    writes: AtomicUsize,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a counter without counting it as a write.
    pub fn seed(&self, user_id: Uuid, counter: UsageCounter) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.insert(user_id, counter);
        }
    }

    /// Number of counter writes performed through `try_consume`.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn counter(&self, user_id: Uuid) -> Res<Option<UsageCounter>> {
        Ok(lock(&self.counters)?.get(&user_id).copied())
    }

    async fn try_consume(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        limit: u32,
    ) -> Res<Option<UsageCounter>> {
        let mut counters = lock(&self.counters)?;
        let current = counters.get(&user_id).copied().unwrap_or_default();
        match current.try_increment(today, limit) {
            Some(next) => {
                counters.insert(user_id, next);
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemorySubscriptionStore {
    rows: Mutex<HashMap<Uuid, Subscription>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn find_by_user(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        Ok(lock(&self.rows)?.get(&user_id).cloned())
    }

    async fn upsert_active(&self, data: SubscriptionActivation) -> Res<Subscription> {
        let mut rows = lock(&self.rows)?;
        let now = Utc::now();
        let (id, created_at) = rows
            .get(&data.user_id)
            .map(|existing| (existing.id, existing.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), now));

        let row = Subscription {
            id,
            user_id: data.user_id,
            plan: data.plan,
            status: SubscriptionStatus::Active,
            amount: Some(data.amount),
            currency: Some(data.currency),
            razorpay_order_id: Some(data.razorpay_order_id),
            razorpay_payment_id: Some(data.razorpay_payment_id),
            razorpay_signature: Some(data.razorpay_signature),
            started_at: Some(data.started_at),
            expires_at: Some(data.expires_at),
            created_at,
            updated_at: now,
        };
        rows.insert(data.user_id, row.clone());
        Ok(row)
    }
}

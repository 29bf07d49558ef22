use chrono::{DateTime, Utc};
use common::{
    error::{AppError, Res},
    jwt::AuthUser,
};
use db::subscription::SubscriptionStore;

use crate::dtos::sub::{CurrentSubscriptionResponse, SubscriptionView};

pub async fn current_subscription(
    store: &dyn SubscriptionStore,
    user: &AuthUser,
    now: DateTime<Utc>,
) -> Res<CurrentSubscriptionResponse> {
    let subscription = store.find_by_user(user.id).await.map_err(|e| {
        log::error!("Failed to load subscription for user {}: {}", user.id, e);
        AppError::Store("Failed to load subscription".to_string())
    })?;

    Ok(CurrentSubscriptionResponse {
        subscription: subscription.map(|s| SubscriptionView::at(s, now)),
    })
}

use super::model::SubscriptionRecord;
use crate::error::AppResult;
use crate::infrastructure::repositories::BillingRepository;
use chrono::NaiveDate;
use std::sync::Arc;

/// The caller's subscriptions as reported by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubscriptionOverview {
    pub subscriptions: Vec<SubscriptionRecord>,
    pub active: Option<SubscriptionRecord>,
}

impl SubscriptionOverview {
    /// The backend's pick when it sent one, otherwise the first record that
    /// is active on `today`.
    pub fn active_on(&self, today: NaiveDate) -> Option<&SubscriptionRecord> {
        self.active
            .as_ref()
            .or_else(|| self.subscriptions.iter().find(|s| s.is_active_on(today)))
    }
}

pub struct SubscriptionAccount {
    billing: Arc<dyn BillingRepository>,
}

impl SubscriptionAccount {
    pub fn new(billing: Arc<dyn BillingRepository>) -> Self {
        Self { billing }
    }

    pub async fn overview(&self) -> AppResult<SubscriptionOverview> {
        let overview = self.billing.my_subscriptions().await?;
        tracing::debug!(
            count = overview.subscriptions.len(),
            has_active = overview.active.is_some(),
            "Loaded subscriptions"
        );
        Ok(overview)
    }

    pub async fn active_subscription(&self, today: NaiveDate) -> AppResult<Option<SubscriptionRecord>> {
        let overview = self.overview().await?;
        Ok(overview.active_on(today).cloned())
    }

    pub async fn cancel(&self, subscription_id: i64, reason: Option<&str>) -> AppResult<String> {
        let message = self.billing.cancel_subscription(subscription_id, reason).await?;
        tracing::info!(subscription_id, "Subscription cancelled");
        Ok(message)
    }
}

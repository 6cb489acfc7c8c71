use crate::domain::subscription::{
    CostCalculation, Plan, SubscriptionOverview, SubscriptionReceipt, SubscriptionRecord,
    SubscriptionRequest,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::http::ApiClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PLANS_PATH: &str = "/api/payments/plans";
const CALCULATE_COST_PATH: &str = "/api/payments/calculate-cost";
const CREATE_SUBSCRIPTION_PATH: &str = "/api/payments/create-subscription";
const MY_SUBSCRIPTIONS_PATH: &str = "/api/payments/my-subscriptions";
const CANCEL_SUBSCRIPTION_PATH: &str = "/api/payments/cancel-subscription";

/// Backend operations behind the purchase flow.
///
/// The backend is the only authority on prices and on double-purchase
/// prevention; implementations must not compute totals themselves.
#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn list_plans(&self) -> AppResult<Vec<Plan>>;

    async fn calculate_cost(&self, request: &SubscriptionRequest) -> AppResult<CostCalculation>;

    /// Requires a signed-in user.
    async fn create_subscription(&self, request: &SubscriptionRequest) -> AppResult<SubscriptionReceipt>;

    /// Requires a signed-in user.
    async fn my_subscriptions(&self) -> AppResult<SubscriptionOverview>;

    /// Requires a signed-in user. Returns the backend's confirmation text.
    async fn cancel_subscription(&self, subscription_id: i64, reason: Option<&str>) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct PlansResponse {
    success: bool,
    #[serde(default)]
    plans: Vec<Plan>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CostResponse {
    success: bool,
    #[serde(default)]
    cost_calculation: Option<CostCalculation>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateSubscriptionResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<SubscriptionReceipt>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MySubscriptionsResponse {
    success: bool,
    #[serde(default)]
    subscriptions: Vec<SubscriptionRecord>,
    #[serde(default)]
    active_subscription: Option<SubscriptionRecord>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CancelRequest<'a> {
    subscription_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// `success: false` bodies that still came back with a 2xx status.
fn ensure_success(success: bool, error: Option<String>, action: &str) -> AppResult<()> {
    if success {
        Ok(())
    } else {
        Err(AppError::Rejected(
            error.unwrap_or_else(|| format!("{} was rejected", action)),
        ))
    }
}

pub struct HttpBillingRepository {
    api: Arc<ApiClient>,
}

impl HttpBillingRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl BillingRepository for HttpBillingRepository {
    async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        let response: PlansResponse = self.api.get(PLANS_PATH).await?;
        ensure_success(response.success, response.error, "Plan listing")?;

        tracing::debug!(count = response.plans.len(), "Fetched plan catalog");
        Ok(response.plans)
    }

    async fn calculate_cost(&self, request: &SubscriptionRequest) -> AppResult<CostCalculation> {
        let response: CostResponse = self.api.post(CALCULATE_COST_PATH, request).await?;
        ensure_success(response.success, response.error, "Cost calculation")?;

        response
            .cost_calculation
            .ok_or_else(|| AppError::Decode("cost_calculation missing from response".to_string()))
    }

    async fn create_subscription(&self, request: &SubscriptionRequest) -> AppResult<SubscriptionReceipt> {
        let response: CreateSubscriptionResponse = self
            .api
            .post_with_auth(CREATE_SUBSCRIPTION_PATH, request)
            .await?;
        ensure_success(response.success, response.error, "Subscription")?;

        let mut receipt = response.data.unwrap_or_default();
        receipt.message = response.message.or(receipt.message);
        Ok(receipt)
    }

    async fn my_subscriptions(&self) -> AppResult<SubscriptionOverview> {
        let response: MySubscriptionsResponse = self.api.get_with_auth(MY_SUBSCRIPTIONS_PATH).await?;
        ensure_success(response.success, response.error, "Subscription listing")?;

        Ok(SubscriptionOverview {
            subscriptions: response.subscriptions,
            active: response.active_subscription,
        })
    }

    async fn cancel_subscription(&self, subscription_id: i64, reason: Option<&str>) -> AppResult<String> {
        let body = CancelRequest {
            subscription_id,
            reason,
        };
        let response: MessageResponse = self
            .api
            .post_with_auth(CANCEL_SUBSCRIPTION_PATH, &body)
            .await?;
        ensure_success(response.success, response.error, "Cancellation")?;

        Ok(response
            .message
            .unwrap_or_else(|| "Subscription cancelled".to_string()))
    }
}

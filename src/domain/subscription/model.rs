use super::money::{Estimate, Money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Daily,
    Monthly,
    Yearly,
    Custom,
}

impl PlanType {
    /// Length the backend bills for when no duration is supplied.
    /// Custom plans have none.
    pub fn default_duration_days(self) -> Option<u32> {
        match self {
            PlanType::Daily => Some(1),
            PlanType::Monthly => Some(30),
            PlanType::Yearly => Some(365),
            PlanType::Custom => None,
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanType::Daily => write!(f, "daily"),
            PlanType::Monthly => write!(f, "monthly"),
            PlanType::Yearly => write!(f, "yearly"),
            PlanType::Custom => write!(f, "custom"),
        }
    }
}

/// Plan feature set. The catalog endpoint sends either a flag map or a plain
/// list of feature names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanFeatures {
    Flags(BTreeMap<String, JsonValue>),
    List(Vec<String>),
}

impl Default for PlanFeatures {
    fn default() -> Self {
        PlanFeatures::Flags(BTreeMap::new())
    }
}

impl PlanFeatures {
    pub fn is_enabled(&self, name: &str) -> bool {
        match self {
            PlanFeatures::Flags(flags) => match flags.get(name) {
                None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => false,
                Some(_) => true,
            },
            PlanFeatures::List(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Catalog entry. Never mutated by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub plan_type: PlanType,
    pub price_per_unit: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub features: PlanFeatures,
}

impl Plan {
    pub fn is_custom(&self) -> bool {
        self.plan_type == PlanType::Custom
    }

    /// Non-binding `price_per_unit × days` figure shown while a custom
    /// duration is being edited.
    pub fn estimate(&self, days: u32) -> Estimate {
        Estimate::new(Money::new(
            self.price_per_unit * Decimal::from(days),
            &self.currency,
        ))
    }

    pub fn unit_price(&self) -> Money {
        Money::new(self.price_per_unit, &self.currency)
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Plan ids arrive as numbers or as numeric strings.
pub(crate) fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Body shared by the calculate-cost and create-subscription calls. The
/// payment step keeps the exact value used for its calculation and sends it
/// again on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub plan_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl SubscriptionRequest {
    pub fn for_plan(plan_id: i64) -> Self {
        Self {
            plan_id,
            duration_days: None,
            start_date: None,
        }
    }
}

/// Server-computed price for a plan and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCalculation {
    #[serde(deserialize_with = "de_id")]
    pub plan_id: i64,
    pub total_cost: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub duration_days: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl CostCalculation {
    pub fn total(&self) -> Money {
        Money::new(self.total_cost, &self.currency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

/// Subscription as echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub plan_id: i64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub custom_duration_days: Option<u32>,
    pub total_amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub plan: Option<Plan>,
}

impl SubscriptionRecord {
    /// Active on `today`: status active and `start <= today <= end`.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                self.status == SubscriptionStatus::Active && start <= today && today <= end
            }
            _ => false,
        }
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        match self.end_date {
            Some(end) if end >= today => (end - today).num_days(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_gateway: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayData {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

/// Successful create-subscription outcome.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubscriptionReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subscription: Option<SubscriptionRecord>,
    #[serde(default)]
    pub payment: Option<PaymentRecord>,
    #[serde(default)]
    pub gateway_data: Option<GatewayData>,
}

impl SubscriptionReceipt {
    /// Opaque handle for the completed purchase: the gateway intent when
    /// present, otherwise the subscription id.
    pub fn reference(&self) -> Option<String> {
        self.gateway_data
            .as_ref()
            .and_then(|g| g.payment_intent_id.clone())
            .or_else(|| {
                self.subscription
                    .as_ref()
                    .and_then(|s| s.id)
                    .map(|id| id.to_string())
            })
    }
}

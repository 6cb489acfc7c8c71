pub mod account;
pub mod duration;
pub mod error;
pub mod model;
pub mod money;
pub mod workflow;

pub use account::{SubscriptionAccount, SubscriptionOverview};
pub use duration::{CustomDuration, DurationOutOfRange};
pub use error::WorkflowError;
pub use model::{
    CostCalculation, GatewayData, PaymentRecord, PaymentStatus, Plan, PlanFeatures, PlanType,
    SubscriptionReceipt, SubscriptionRecord, SubscriptionRequest, SubscriptionStatus,
};
pub use money::{format_duration, format_money, Estimate, Money};
pub use workflow::{CompletionHandler, SubscriptionWorkflow, WorkflowStep, WorkflowView};

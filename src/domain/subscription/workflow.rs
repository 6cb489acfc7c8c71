use super::duration::CustomDuration;
use super::error::WorkflowError;
use super::model::{CostCalculation, Plan, SubscriptionReceipt, SubscriptionRequest};
use super::money::{format_duration, Estimate};
use crate::infrastructure::repositories::BillingRepository;
use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

const PLANS_FAILED: &str = "Failed to load subscription plans";
const COST_FAILED: &str = "Failed to calculate subscription cost";
const PAYMENT_FAILED: &str = "Payment failed. Please check your connection and try again.";

/// Called once per successful purchase, after the workflow has closed.
pub type CompletionHandler = Arc<dyn Fn(&SubscriptionReceipt) + Send + Sync>;

/// Where the purchase flow currently is. A payment step always carries the
/// server calculation it will charge and the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowStep {
    Plans,
    Custom {
        plan: Plan,
        duration: CustomDuration,
    },
    Payment {
        plan: Plan,
        calculation: CostCalculation,
        request: SubscriptionRequest,
    },
}

impl WorkflowStep {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowStep::Plans => "plans",
            WorkflowStep::Custom { .. } => "custom",
            WorkflowStep::Payment { .. } => "payment",
        }
    }
}

/// Read model for rendering the flow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowView {
    pub open: bool,
    pub step: WorkflowStep,
    pub plans: Vec<Plan>,
    pub error: Option<String>,
    /// Catalog fetch or cost calculation outstanding.
    pub loading: bool,
    pub submitting: bool,
}

impl WorkflowView {
    /// Non-binding figure for the custom step.
    pub fn estimate(&self) -> Option<Estimate> {
        match &self.step {
            WorkflowStep::Custom { plan, duration } => Some(plan.estimate(duration.days())),
            _ => None,
        }
    }

    /// Server-confirmed total for the payment step.
    pub fn total_text(&self) -> Option<String> {
        match &self.step {
            WorkflowStep::Payment { calculation, .. } => Some(calculation.total().to_string()),
            _ => None,
        }
    }

    pub fn duration_text(&self) -> Option<String> {
        match &self.step {
            WorkflowStep::Custom { duration, .. } => Some(format_duration(duration.days())),
            WorkflowStep::Payment { calculation, .. } => {
                Some(format_duration(calculation.duration_days))
            }
            WorkflowStep::Plans => None,
        }
    }

    pub fn can_continue(&self) -> bool {
        matches!(&self.step, WorkflowStep::Custom { duration, .. } if duration.days() >= 1)
            && !self.loading
    }
}

/// Identifies the state a request was issued against. A response is applied
/// only while the ticket still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    session: Uuid,
    generation: u64,
}

struct State {
    session: Option<Uuid>,
    generation: u64,
    step: WorkflowStep,
    plans: Vec<Plan>,
    error: Option<String>,
    loading: bool,
    submitting: bool,
}

impl State {
    fn closed() -> Self {
        Self {
            session: None,
            generation: 0,
            step: WorkflowStep::Plans,
            plans: Vec::new(),
            error: None,
            loading: false,
            submitting: false,
        }
    }

    fn session(&self) -> Result<Uuid, WorkflowError> {
        self.session.ok_or(WorkflowError::Closed)
    }

    fn ticket(&self) -> Option<Ticket> {
        self.session.map(|session| Ticket {
            session,
            generation: self.generation,
        })
    }

    /// Invalidate anything issued against the current step.
    fn advance(&mut self) -> Result<Ticket, WorkflowError> {
        let session = self.session()?;
        self.generation += 1;
        Ok(Ticket {
            session,
            generation: self.generation,
        })
    }
}

/// Plan selection, optional custom duration, cost confirmation and payment.
///
/// All methods take `&self`; the state lock is released before every backend
/// call, so overlapping calls are possible and are refused where they would
/// conflict (`Busy`, `SubmissionInFlight`). Responses that come back after
/// the workflow was closed, reopened or moved to another step are dropped and
/// reported as `Stale`.
pub struct SubscriptionWorkflow {
    billing: Arc<dyn BillingRepository>,
    on_complete: CompletionHandler,
    state: Mutex<State>,
}

impl SubscriptionWorkflow {
    pub fn new(billing: Arc<dyn BillingRepository>, on_complete: CompletionHandler) -> Self {
        Self {
            billing,
            on_complete,
            state: Mutex::new(State::closed()),
        }
    }

    /// Start a new session and fetch the catalog. A failed fetch leaves the
    /// workflow open with an empty catalog and an error.
    pub async fn open(&self) -> Result<(), WorkflowError> {
        let ticket = {
            let mut state = self.state.lock();
            *state = State::closed();
            state.session = Some(Uuid::new_v4());
            state.loading = true;
            state.advance()?
        };
        tracing::info!(session = %ticket.session, "Subscription workflow opened");

        let result = self.billing.list_plans().await;

        let mut state = self.state.lock();
        if state.ticket() != Some(ticket) {
            tracing::debug!(session = %ticket.session, "Discarding catalog for a stale session");
            return Err(WorkflowError::Stale);
        }
        state.loading = false;

        match result {
            Ok(plans) => {
                tracing::debug!(count = plans.len(), "Plan catalog loaded");
                state.plans = plans;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load subscription plans");
                state.plans.clear();
                state.error = Some(PLANS_FAILED.to_string());
                Err(WorkflowError::Request(PLANS_FAILED.to_string()))
            }
        }
    }

    /// Custom plans move to duration entry; anything else is priced right
    /// away and moves to payment.
    pub async fn select_plan(&self, plan_id: i64) -> Result<(), WorkflowError> {
        let (ticket, plan) = {
            let mut state = self.state.lock();
            state.session()?;
            if !matches!(state.step, WorkflowStep::Plans) {
                return Err(WorkflowError::WrongStep(state.step.name()));
            }
            if state.loading {
                return Err(WorkflowError::Busy);
            }

            let found = state.plans.iter().find(|p| p.id == plan_id).cloned();
            let plan = match found {
                Some(plan) => plan,
                None => {
                    state.error = Some(format!("Plan {} is not available", plan_id));
                    return Err(WorkflowError::UnknownPlan(plan_id));
                }
            };
            state.error = None;

            if plan.is_custom() {
                tracing::debug!(plan_id, "Custom plan selected");
                state.advance()?;
                state.step = WorkflowStep::Custom {
                    plan,
                    duration: CustomDuration::starting(today()),
                };
                return Ok(());
            }

            state.loading = true;
            (state.advance()?, plan)
        };

        let request = SubscriptionRequest::for_plan(plan.id);
        self.calculate(ticket, plan, request).await
    }

    pub fn set_custom_days(&self, days: i64) -> Result<(), WorkflowError> {
        self.edit_custom(|duration| duration.set_days(days).map_err(WorkflowError::from))
    }

    pub fn set_custom_start_date(&self, start_date: NaiveDate) -> Result<(), WorkflowError> {
        self.edit_custom(|duration| {
            duration.set_start_date(start_date);
            Ok(())
        })
    }

    pub fn can_continue(&self) -> bool {
        self.snapshot().can_continue()
    }

    /// Price the edited duration and move to payment.
    pub async fn confirm_custom(&self) -> Result<(), WorkflowError> {
        let (ticket, plan, request) = {
            let mut state = self.state.lock();
            state.session()?;
            if state.loading {
                return Err(WorkflowError::Busy);
            }
            let (plan, duration) = match &state.step {
                WorkflowStep::Custom { plan, duration } => (plan.clone(), *duration),
                other => return Err(WorkflowError::WrongStep(other.name())),
            };

            let request = SubscriptionRequest {
                plan_id: plan.id,
                duration_days: Some(duration.days()),
                start_date: Some(duration.start_date()),
            };
            state.error = None;
            state.loading = true;
            (state.advance()?, plan, request)
        };

        self.calculate(ticket, plan, request).await
    }

    /// One step towards the catalog. Refused while a payment is in flight.
    pub fn back(&self) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        state.session()?;
        if state.submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }

        let previous = std::mem::replace(&mut state.step, WorkflowStep::Plans);
        state.step = match previous {
            WorkflowStep::Plans => WorkflowStep::Plans,
            WorkflowStep::Custom { .. } => WorkflowStep::Plans,
            WorkflowStep::Payment { plan, request, .. } if plan.is_custom() => {
                let duration = match (request.duration_days, request.start_date) {
                    (Some(days), Some(start)) => CustomDuration::new(days, start).ok(),
                    _ => None,
                }
                .unwrap_or_else(|| CustomDuration::starting(today()));
                WorkflowStep::Custom { plan, duration }
            }
            WorkflowStep::Payment { .. } => WorkflowStep::Plans,
        };
        state.error = None;
        state.loading = false;
        state.advance()?;
        tracing::debug!(step = state.step.name(), "Workflow moved back");
        Ok(())
    }

    /// Submit the purchase for the displayed calculation. On success the
    /// completion handler runs once and the workflow closes.
    pub async fn pay(&self) -> Result<SubscriptionReceipt, WorkflowError> {
        let (session, request) = {
            let mut state = self.state.lock();
            let session = state.session()?;
            let request = match &state.step {
                WorkflowStep::Payment { request, .. } => request.clone(),
                other => return Err(WorkflowError::WrongStep(other.name())),
            };
            if state.submitting {
                tracing::warn!(plan_id = request.plan_id, "Payment already in flight, ignoring");
                return Err(WorkflowError::SubmissionInFlight);
            }
            state.submitting = true;
            state.error = None;
            (session, request)
        };
        tracing::info!(plan_id = request.plan_id, "Submitting subscription");

        let result = self.billing.create_subscription(&request).await;

        let receipt = {
            let mut state = self.state.lock();
            if state.session != Some(session) {
                tracing::warn!(
                    plan_id = request.plan_id,
                    succeeded = result.is_ok(),
                    "Payment finished after the workflow was closed, discarding"
                );
                return Err(WorkflowError::Stale);
            }
            state.submitting = false;

            match result {
                Ok(receipt) => {
                    *state = State::closed();
                    receipt
                }
                Err(e) => {
                    tracing::error!(plan_id = request.plan_id, error = %e, "Payment failed");
                    let err = WorkflowError::from_request(&e, PAYMENT_FAILED);
                    state.error = Some(err.to_string());
                    return Err(err);
                }
            }
        };

        tracing::info!(
            plan_id = request.plan_id,
            reference = receipt.reference().as_deref().unwrap_or("-"),
            "Subscription created"
        );
        (self.on_complete)(&receipt);
        Ok(receipt)
    }

    /// Tear the session down. Outstanding responses will be discarded.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if let Some(session) = state.session {
            tracing::debug!(session = %session, "Subscription workflow closed");
        }
        *state = State::closed();
    }

    pub fn snapshot(&self) -> WorkflowView {
        let state = self.state.lock();
        WorkflowView {
            open: state.session.is_some(),
            step: state.step.clone(),
            plans: state.plans.clone(),
            error: state.error.clone(),
            loading: state.loading,
            submitting: state.submitting,
        }
    }

    fn edit_custom(
        &self,
        edit: impl FnOnce(&mut CustomDuration) -> Result<(), WorkflowError>,
    ) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        state.session()?;
        if state.loading {
            return Err(WorkflowError::Busy);
        }
        match &mut state.step {
            WorkflowStep::Custom { duration, .. } => edit(duration),
            other => Err(WorkflowError::WrongStep(other.name())),
        }
    }

    async fn calculate(
        &self,
        ticket: Ticket,
        plan: Plan,
        request: SubscriptionRequest,
    ) -> Result<(), WorkflowError> {
        tracing::debug!(
            plan_id = plan.id,
            duration_days = ?request.duration_days,
            "Requesting cost calculation"
        );
        let result = self.billing.calculate_cost(&request).await;

        let mut state = self.state.lock();
        if state.ticket() != Some(ticket) {
            tracing::debug!(plan_id = plan.id, "Discarding stale cost calculation");
            return Err(WorkflowError::Stale);
        }
        state.loading = false;

        match result {
            Ok(calculation) => {
                tracing::info!(
                    plan_id = plan.id,
                    total = %calculation.total(),
                    duration_days = calculation.duration_days,
                    "Cost calculated"
                );
                state.step = WorkflowStep::Payment {
                    plan,
                    calculation,
                    request,
                };
                state.advance()?;
                Ok(())
            }
            Err(e) => {
                tracing::error!(plan_id = plan.id, error = %e, "Cost calculation failed");
                let err = WorkflowError::from_request(&e, COST_FAILED);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

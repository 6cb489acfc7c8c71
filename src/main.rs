use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runbox_client::domain::auth::SessionService;
use runbox_client::domain::preferences::PreferenceStore;
use runbox_client::domain::subscription::{
    format_duration, SubscriptionAccount, SubscriptionReceipt, SubscriptionWorkflow, WorkflowStep,
};
use runbox_client::infrastructure::config::{Config, LogFormat};
use runbox_client::infrastructure::http::ApiClient;
use runbox_client::infrastructure::repositories::{
    BillingRepository, CachedPreferenceBackend, HttpBillingRepository, HttpPreferenceBackend,
};
use runbox_client::infrastructure::storage::{FileStore, LocalStore};
use runbox_client::error::SIGN_IN_REQUIRED;
use runbox_client::AppResult;

const USAGE: &str = "usage: runbox-client <command>

commands:
  plans                               list subscription plans
  subscribe <plan_id> [days] [start]  buy a plan (days/start only for custom plans)
  subscriptions                       show your subscriptions
  cancel <subscription_id> [reason]   cancel a subscription
  preferences                         show effective preferences
  reset-preferences                   clear stored preferences
  whoami                              show the signed-in user
  login <token>                       store a session token
  logout                              forget the session token";

enum Command {
    Plans,
    Subscribe {
        plan_id: i64,
        days: Option<i64>,
        start: Option<NaiveDate>,
    },
    Subscriptions,
    Cancel {
        subscription_id: i64,
        reason: Option<String>,
    },
    Preferences,
    ResetPreferences,
    WhoAmI,
    Login(String),
    Logout,
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let arg = |i: usize| args.get(i).map(String::as_str);

        let command = match arg(0) {
            Some("plans") => Command::Plans,
            Some("subscribe") => Command::Subscribe {
                plan_id: arg(1).context("missing plan id")?.parse().context("invalid plan id")?,
                days: arg(2).map(str::parse).transpose().context("invalid days")?,
                start: arg(3).map(str::parse).transpose().context("invalid start date")?,
            },
            Some("subscriptions") => Command::Subscriptions,
            Some("cancel") => Command::Cancel {
                subscription_id: arg(1)
                    .context("missing subscription id")?
                    .parse()
                    .context("invalid subscription id")?,
                reason: args.get(2..).filter(|rest| !rest.is_empty()).map(|rest| rest.join(" ")),
            },
            Some("preferences") => Command::Preferences,
            Some("reset-preferences") => Command::ResetPreferences,
            Some("whoami") => Command::WhoAmI,
            Some("login") => Command::Login(arg(1).context("missing token")?.to_string()),
            Some("logout") => Command::Logout,
            Some(other) => bail!("unknown command {:?}\n\n{}", other, USAGE),
            None => bail!(USAGE),
        };
        Ok(command)
    }
}

struct App {
    store: Arc<dyn LocalStore>,
    api: Arc<ApiClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    tracing::debug!(
        api_base_url = %config.api_base_url,
        local_store = %config.local_store_path.display(),
        "Client configured"
    );

    let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(config.local_store_path.clone()));
    let api = Arc::new(ApiClient::new(
        &config.api_base_url,
        config.request_timeout(),
        store.clone(),
    )?);

    if let Err(e) = run(App { store, api }, command).await {
        if e.requires_sign_in() {
            bail!(
                "{}. Run `runbox-client login <token>` first.",
                e.user_message(SIGN_IN_REQUIRED)
            );
        }
        return Err(e.into());
    }
    Ok(())
}

async fn run(app: App, command: Command) -> AppResult<()> {
    let billing: Arc<dyn BillingRepository> = Arc::new(HttpBillingRepository::new(app.api.clone()));
    let session = SessionService::new(app.store.clone());

    match command {
        Command::Plans => {
            for plan in billing.list_plans().await? {
                let unit = match plan.plan_type.default_duration_days() {
                    Some(days) => format_duration(days),
                    None => "day".to_string(),
                };
                println!("{:>4}  {:<20} {} / {}", plan.id, plan.name, plan.unit_price(), unit);
            }
        }
        Command::Subscribe {
            plan_id,
            days,
            start,
        } => subscribe(billing, plan_id, days, start).await?,
        Command::Subscriptions => {
            let account = SubscriptionAccount::new(billing);
            let today = Local::now().date_naive();
            let overview = account.overview().await?;
            if overview.subscriptions.is_empty() {
                println!("No subscriptions");
            }
            for record in &overview.subscriptions {
                println!(
                    "{:>4}  plan {:<4} {:?} {} - {}  {} left",
                    record.id.unwrap_or_default(),
                    record.plan_id,
                    record.status,
                    record.start_date.map(|d| d.to_string()).unwrap_or_default(),
                    record.end_date.map(|d| d.to_string()).unwrap_or_default(),
                    format_duration(u32::try_from(record.days_remaining(today)).unwrap_or(0)),
                );
            }
            if let Some(active) = overview.active_on(today) {
                println!("Active: plan {}", active.plan_id);
            }
        }
        Command::Cancel {
            subscription_id,
            reason,
        } => {
            let account = SubscriptionAccount::new(billing);
            println!("{}", account.cancel(subscription_id, reason.as_deref()).await?);
        }
        Command::Preferences => {
            let preferences = preference_store(&app).load().await;
            println!("{}", serde_json::to_string_pretty(&preferences)?);
        }
        Command::ResetPreferences => {
            let remote_cleared = preference_store(&app).reset().await;
            println!(
                "Preferences reset{}",
                if remote_cleared { "" } else { " locally (backend unreachable)" }
            );
        }
        Command::WhoAmI => match session.current_user().await {
            Some(user) => println!("{} <{}> ({})", user.id, user.email, user.role),
            None => println!("Not signed in"),
        },
        Command::Login(token) => {
            let user = session.sign_in(&token).await?;
            println!("Signed in as {} ({})", user.email, user.role);
        }
        Command::Logout => {
            session.sign_out().await?;
            println!("Signed out");
        }
    }

    Ok(())
}

/// Drive the purchase workflow non-interactively.
async fn subscribe(
    billing: Arc<dyn BillingRepository>,
    plan_id: i64,
    days: Option<i64>,
    start: Option<NaiveDate>,
) -> AppResult<()> {
    let workflow = SubscriptionWorkflow::new(
        billing,
        Arc::new(|receipt: &SubscriptionReceipt| {
            tracing::info!(reference = ?receipt.reference(), "Purchase completed");
        }),
    );

    workflow.open().await?;
    workflow.select_plan(plan_id).await?;

    if let WorkflowStep::Custom { .. } = workflow.snapshot().step {
        if let Some(start) = start {
            workflow.set_custom_start_date(start)?;
        }
        if let Some(days) = days {
            workflow.set_custom_days(days)?;
        }
        if let Some(estimate) = workflow.snapshot().estimate() {
            println!("Estimated {}", estimate);
        }
        workflow.confirm_custom().await?;
    }

    let view = workflow.snapshot();
    println!(
        "Total {} for {}",
        view.total_text().unwrap_or_default(),
        view.duration_text().unwrap_or_default()
    );

    let receipt = workflow.pay().await?;
    println!(
        "{} (reference {})",
        receipt.message.as_deref().unwrap_or("Subscription created"),
        receipt.reference().unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}

fn preference_store(app: &App) -> PreferenceStore {
    PreferenceStore::new(
        Arc::new(HttpPreferenceBackend::new(app.api.clone())),
        Arc::new(CachedPreferenceBackend::new(app.store.clone())),
    )
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_development() {
        "runbox_client=debug,tower_http=debug"
    } else {
        "runbox_client=info"
    };

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

//! `fitlog`: command-line client for the fitlog activity tracker.
//!
//! Writes made while offline land in the local SQLite queue and are replayed
//! by `fitlog sync` once the backend is reachable.

mod context;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use fitlog_core::activities::{ActivityServiceTrait, NewActivityInput};
use fitlog_core::activity_types::{ActivityTypeServiceTrait, NewActivityType};
use fitlog_core::dashboard::{parse_reference_date, AggregationServiceTrait};
use fitlog_core::owners::{OwnerProfileInput, OwnerProfileServiceTrait};
use fitlog_core::sync::HttpMethod;
use fitlog_offline_sync::{ClientConfig, SendOutcome};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use context::ServiceContext;

const ACTIVITIES_PATH: &str = "/api/v1/activities";

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Offline-first client for the fitlog activity tracker")]
struct Cli {
    /// Directory holding the local database
    #[arg(long, env = "FITLOG_DATA_DIR", default_value = ".fitlog")]
    data_dir: PathBuf,

    /// Backend base URL (overrides FITLOG_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Treat the network as unreachable: writes are queued, reads fail
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print connectivity, queue size and the last sync error
    Status,
    /// Queue a request without attempting to send it
    Enqueue(RequestArgs),
    /// Replay the offline queue
    Sync,
    /// Drop every queued request
    Clear,
    /// Send a request now, or queue it if that is not possible
    Send(RequestArgs),
    /// Create an activity on the backend, queueing it while offline
    LogActivity(ActivityArgs),
    /// Fetch the backend dashboard
    Dashboard {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Inspect or change the local owner id
    Owner {
        #[command(subcommand)]
        action: Option<OwnerAction>,
    },
    /// Work against the local store only
    Local {
        #[command(subcommand)]
        action: LocalAction,
    },
}

#[derive(Args)]
struct RequestArgs {
    method: HttpMethod,
    url: String,
    /// JSON body
    #[arg(long)]
    data: Option<String>,
}

#[derive(Args)]
struct ActivityArgs {
    #[arg(long = "type")]
    activity_type_id: String,
    /// RFC 3339 start instant
    #[arg(long)]
    start: DateTime<Utc>,
    /// RFC 3339 end instant
    #[arg(long)]
    end: DateTime<Utc>,
    /// Derived from start and end when omitted
    #[arg(long)]
    duration_minutes: Option<i32>,
    #[arg(long)]
    calories_override: Option<Decimal>,
    #[arg(long)]
    notes: Option<String>,
}

impl ActivityArgs {
    fn into_input(self) -> NewActivityInput {
        NewActivityInput {
            id: None,
            activity_type_id: self.activity_type_id,
            start_time: self.start,
            end_time: self.end,
            duration_minutes: self.duration_minutes,
            calories_override: self.calories_override,
            notes: self.notes,
            client_temp_id: None,
        }
    }
}

#[derive(Subcommand)]
enum OwnerAction {
    /// Print the owner id (default)
    Show,
    /// Adopt an existing owner id
    Set { owner_id: String },
    /// Forget the owner id and generate a fresh one
    Reset,
}

#[derive(Subcommand)]
enum LocalAction {
    /// List activity types
    Types,
    /// Add an activity type
    AddType {
        #[arg(long)]
        name: String,
        #[arg(long)]
        met: Decimal,
        #[arg(long)]
        description: Option<String>,
    },
    /// Set the body measurements used for calorie estimates
    Profile {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        weight_kg: Option<Decimal>,
        #[arg(long)]
        height_cm: Option<Decimal>,
    },
    /// Record an activity
    Log(ActivityArgs),
    /// List recorded activities, newest first
    Activities,
    /// Daily, weekly and monthly totals around a date
    Dashboard {
        /// RFC 3339 instant or YYYY-MM-DD; invalid values mean now
        #[arg(long)]
        date: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome(outcome: SendOutcome) -> Result<()> {
    match outcome {
        SendOutcome::Sent(response) => print_json(&json!({ "sent": true, "response": response })),
        SendOutcome::Queued(id) => print_json(&json!({ "sent": false, "queuedId": id })),
    }
}

/// Rejects malformed bodies before they reach the queue.
fn validated_body(data: Option<String>) -> Result<Option<String>> {
    if let Some(raw) = &data {
        serde_json::from_str::<Value>(raw).context("--data must be valid JSON")?;
    }
    Ok(data)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url);
    }
    let ctx = ServiceContext::build(&cli.data_dir, config, !cli.offline).await?;

    match cli.command {
        Command::Status => print_json(&ctx.engine.status()),
        Command::Enqueue(args) => {
            let data = validated_body(args.data)?;
            let id = ctx.engine.add_to_queue(args.method, &args.url, data).await?;
            print_json(&json!({ "queuedId": id }))
        }
        Command::Sync => match ctx.engine.sync_queue().await? {
            Some(report) => {
                info!("Sync finished");
                print_json(&json!({ "report": report, "status": ctx.engine.status() }))
            }
            None => bail!("sync skipped: offline or already syncing"),
        },
        Command::Clear => {
            ctx.engine.clear_queue().await?;
            print_json(&ctx.engine.status())
        }
        Command::Send(args) => {
            let data = validated_body(args.data)?;
            let outcome = ctx
                .engine
                .send_or_enqueue(args.method, &args.url, data)
                .await?;
            print_outcome(outcome)
        }
        Command::LogActivity(args) => {
            let input = args.into_input();
            input.validate()?;
            let body = serde_json::to_string(&input)?;
            let outcome = ctx
                .engine
                .send_or_enqueue(HttpMethod::Post, ACTIVITIES_PATH, Some(body))
                .await?;
            print_outcome(outcome)
        }
        Command::Dashboard { date } => print_json(&ctx.client.dashboard(date).await?),
        Command::Owner { action } => run_owner(&ctx, action.unwrap_or(OwnerAction::Show)).await,
        Command::Local { action } => run_local(&ctx, action).await,
    }
}

async fn run_owner(ctx: &ServiceContext, action: OwnerAction) -> Result<()> {
    let owner_id = match action {
        OwnerAction::Show => ctx.owner_id.clone(),
        OwnerAction::Set { owner_id } => ctx.identity.set_owner_id(&owner_id).await?,
        OwnerAction::Reset => {
            ctx.identity.clear_owner_id().await?;
            ctx.identity.get_or_create_owner_id().await?
        }
    };
    ctx.client.set_owner_id(&owner_id)?;
    print_json(&json!({ "ownerId": owner_id }))
}

async fn run_local(ctx: &ServiceContext, action: LocalAction) -> Result<()> {
    let owner_id = ctx.owner_id.as_str();
    match action {
        LocalAction::Types => print_json(&ctx.activity_type_service.list_activity_types()?),
        LocalAction::AddType {
            name,
            met,
            description,
        } => {
            let created = ctx
                .activity_type_service
                .create_activity_type(NewActivityType {
                    id: None,
                    name,
                    met,
                    description,
                })
                .await?;
            print_json(&created)
        }
        LocalAction::Profile {
            display_name,
            weight_kg,
            height_cm,
        } => {
            let profile = ctx
                .owner_profile_service
                .upsert_profile(
                    owner_id,
                    OwnerProfileInput {
                        display_name,
                        weight_kg,
                        height_cm,
                    },
                )
                .await?;
            print_json(&profile)
        }
        LocalAction::Log(args) => {
            let result = ctx
                .activity_service
                .create_activity(owner_id, args.into_input())
                .await?;
            print_json(&result)
        }
        LocalAction::Activities => print_json(&ctx.activity_service.list_activities(owner_id)?),
        LocalAction::Dashboard { date } => {
            let reference = parse_reference_date(date.as_deref(), Utc::now());
            print_json(&ctx.aggregation_service.get_dashboard(owner_id, reference)?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fitlog=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_with_method_and_body() {
        let cli = Cli::try_parse_from([
            "fitlog",
            "--offline",
            "send",
            "put",
            "/api/v1/owners/profile",
            "--data",
            r#"{"weightKg":70}"#,
        ])
        .expect("parse");
        assert!(cli.offline);
        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.method, HttpMethod::Put);
                assert_eq!(args.url, "/api/v1/owners/profile");
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(Cli::try_parse_from(["fitlog", "enqueue", "TRACE", "/x"]).is_err());
    }

    #[test]
    fn log_activity_builds_input() {
        let cli = Cli::try_parse_from([
            "fitlog",
            "log-activity",
            "--type",
            "t1",
            "--start",
            "2024-03-01T10:00:00Z",
            "--end",
            "2024-03-01T10:30:00Z",
            "--calories-override",
            "250.5",
        ])
        .expect("parse");
        let Command::LogActivity(args) = cli.command else {
            panic!("expected log-activity");
        };
        let input = args.into_input();
        assert_eq!(input.activity_type_id, "t1");
        assert_eq!(input.calories_override, Some(Decimal::new(2505, 1)));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(validated_body(Some("{not json".into())).is_err());
        assert!(validated_body(None).unwrap().is_none());
    }

    #[tokio::test]
    async fn local_commands_run_against_a_fresh_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ServiceContext::build(dir.path(), ClientConfig::default(), false)
            .await
            .expect("context");

        run_local(
            &ctx,
            LocalAction::AddType {
                name: "Cycling".into(),
                met: Decimal::new(75, 1),
                description: None,
            },
        )
        .await
        .expect("add type");
        let types = ctx.activity_type_service.list_activity_types().unwrap();
        assert_eq!(types.len(), 1);

        run_local(
            &ctx,
            LocalAction::Profile {
                display_name: None,
                weight_kg: Some(Decimal::new(70, 0)),
                height_cm: None,
            },
        )
        .await
        .expect("profile");

        let args = ActivityArgs {
            activity_type_id: types[0].id.clone(),
            start: "2024-03-01T10:00:00Z".parse().unwrap(),
            end: "2024-03-01T11:00:00Z".parse().unwrap(),
            duration_minutes: None,
            calories_override: None,
            notes: None,
        };
        run_local(&ctx, LocalAction::Log(args)).await.expect("log");

        let activities = ctx.activity_service.list_activities(&ctx.owner_id).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].duration_minutes, 60);
        assert_eq!(activities[0].calories_burned, Decimal::new(525, 0));
    }

    #[tokio::test]
    async fn offline_writes_are_queued_in_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ServiceContext::build(dir.path(), ClientConfig::default(), false)
            .await
            .expect("context");

        let outcome = ctx
            .engine
            .send_or_enqueue(HttpMethod::Delete, "/api/v1/activities/a1", None)
            .await
            .expect("queued");
        assert!(matches!(outcome, SendOutcome::Queued(_)));
        assert_eq!(ctx.engine.status().queue_count, 1);
        assert!(!ctx.engine.status().is_online);
        assert!(ctx.engine.is_attached());
    }
}

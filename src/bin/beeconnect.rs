//! beeconnect - admin console core from the command line
//!
//! Usage: beeconnect <command>
//!
//! Reads configuration from the environment (and `.env`), the session from
//! `BEECONNECT_SESSION_FILE`.

use anyhow::{anyhow, bail, Context, Result};
use beeconnect::navigation::{self, beeconnect::DASHBOARD_PATH, MenuState};
use beeconnect::permissions::PolicyEditor;
use beeconnect::session::{
    ExpiryWatch, FileSessionStore, GuardDecision, SessionContext, SessionEvent, SessionGuard,
    SystemClock,
};
use beeconnect::sms::validate_recipients_file;
use beeconnect::AppConfig;
use beeconnect_client::{HttpClient, Resource, ResourceApi, StatsEndpoint};
use beeconnect_types::{OrgTypeId, PageRequest, RoleId, SessionRecord};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "beeconnect")]
#[command(about = "BeeConnect admin console core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the sidebar menu for the stored session
    Menu {
        /// Current route
        #[arg(long, default_value = DASHBOARD_PATH)]
        path: String,
    },

    /// Inspect or change the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Read or edit the policy assigned to an organization type and role
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },

    /// Browse paginated backend resources
    Resources {
        #[command(subcommand)]
        action: ResourceAction,
    },

    /// Dashboard statistics
    Stats {
        #[arg(value_enum)]
        kind: StatsKind,
    },

    /// Bulk SMS helpers
    Sms {
        #[command(subcommand)]
        action: SmsAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show the stored session and credential expiry
    Status,
    /// Store a session issued by the backend
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        session_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<i32>,
        #[arg(long)]
        org_id: Option<String>,
        #[arg(long)]
        org_name: Option<String>,
        #[arg(long)]
        org_type: Option<i32>,
        /// Comma-separated policy keys
        #[arg(long, value_delimiter = ',')]
        policies: Vec<String>,
    },
    /// Clear the stored session
    Logout,
    /// Wait until the stored credential expires
    Watch,
}

#[derive(Subcommand)]
enum PolicyAction {
    /// Show categories and the checked keys for a selection
    Show {
        #[arg(long)]
        org_type: i32,
        #[arg(long)]
        role: i32,
    },
    /// Replace one category's checked keys and save
    Set {
        #[arg(long)]
        org_type: i32,
        #[arg(long)]
        role: i32,
        #[arg(long)]
        category: String,
        /// Comma-separated policy keys
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ResourceAction {
    /// List one page of a resource
    List {
        /// organizations, applicants, services, service-categories,
        /// enterprises, users, sms-messages, sms-templates
        resource: String,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
}

#[derive(Subcommand)]
enum SmsAction {
    /// Check a recipient CSV file
    Validate { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatsKind {
    Applicants,
    Applications,
    Geomap,
}

impl From<StatsKind> for StatsEndpoint {
    fn from(kind: StatsKind) -> Self {
        match kind {
            StatsKind::Applicants => StatsEndpoint::Applicants,
            StatsKind::Applications => StatsEndpoint::Applications,
            StatsKind::Geomap => StatsEndpoint::GeoMap,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beeconnect=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Menu { path } => menu(&config, &path),
        Command::Session { action } => session(&config, action).await,
        Command::Policy { action } => policy(&config, action).await,
        Command::Resources { action } => resources(&config, action).await,
        Command::Stats { kind } => stats(&config, kind).await,
        Command::Sms { action } => sms(action),
    }
}

fn load_session(config: &AppConfig) -> Result<SessionContext> {
    let store = Arc::new(FileSessionStore::new(&config.session_file));
    let path = store.path().to_path_buf();
    SessionContext::load(store)
        .with_context(|| format!("Failed to read session from {}", path.display()))
}

/// Backend client carrying the stored credential. Fails when there is no session.
fn authed_client(config: &AppConfig) -> Result<HttpClient> {
    let ctx = load_session(config)?;
    if ctx.check_access() == GuardDecision::RedirectToLogin {
        bail!("Not logged in; run `beeconnect session login` first");
    }
    let token = ctx.credential().unwrap_or_default().to_string();
    let client = HttpClient::new(&config.api_url, config.http_timeout)
        .with_context(|| format!("Invalid API URL: {}", config.api_url))?;
    Ok(client.with_token(token))
}

fn menu(config: &AppConfig, path: &str) -> Result<()> {
    let ctx = load_session(config)?;
    let definition = navigation::beeconnect::sidebar()?;
    let tree = navigation::build_for_user(&definition, &ctx.capabilities());
    let state = MenuState::initial(&tree, path);
    print!("{}", state.render(&tree));
    Ok(())
}

async fn session(config: &AppConfig, action: SessionAction) -> Result<()> {
    let mut ctx = load_session(config)?;

    match action {
        SessionAction::Status => {
            let Some(record) = ctx.record() else {
                println!("No session");
                return Ok(());
            };
            println!("Session:  {}", record.session_id.as_deref().unwrap_or("-"));
            println!("User:     {}", record.display_name());
            println!(
                "Role:     {}",
                record.role.map(|r| r.to_string()).unwrap_or("-".into())
            );
            println!(
                "Org:      {} (type {})",
                record.org_name.as_deref().unwrap_or("-"),
                record.org_type.map(|t| t.to_string()).unwrap_or("-".into())
            );
            println!("Policies: {}", record.policies.join(", "));
            match beeconnect::session::decode_expiry(&record.token) {
                Ok(expires_at) => match chrono::DateTime::from_timestamp_millis(expires_at) {
                    Some(at) => println!("Expires:  {}", at.to_rfc3339()),
                    None => println!("Expires:  {expires_at} ms"),
                },
                Err(e) => println!("Expires:  unknown ({e})"),
            }
        }
        SessionAction::Login {
            token,
            session_id,
            name,
            role,
            org_id,
            org_name,
            org_type,
            policies,
        } => {
            let mut record = SessionRecord::new(token, session_id).with_policies(policies);
            if let Some(name) = name {
                record = record.with_name(name);
            }
            if let Some(role) = role {
                record = record.with_role(RoleId(role));
            }
            if let Some(org_type) = org_type {
                record = record.with_org(
                    org_id.unwrap_or_default(),
                    org_name.unwrap_or_default(),
                    OrgTypeId(org_type),
                );
            }
            ctx.login(record)?;
            println!("Session stored in {}", config.session_file.display());
        }
        SessionAction::Logout => {
            ctx.logout()?;
            println!("Logged out");
        }
        SessionAction::Watch => {
            let token = ctx
                .credential()
                .ok_or_else(|| anyhow!("No session to watch"))?
                .to_string();
            let (mut guard, mut events) = SessionGuard::new(Arc::new(SystemClock));

            match guard.arm_expiry_watch(&token) {
                ExpiryWatch::Undetermined => {
                    println!("Credential expiry unknown; nothing to watch");
                    return Ok(());
                }
                ExpiryWatch::AlreadyExpired => {}
                ExpiryWatch::Armed { remaining } => {
                    println!("Credential expires in {}s", remaining.as_secs());
                }
            }

            tokio::select! {
                event = events.recv() => {
                    if let Some(event @ SessionEvent::Expired) = event {
                        ctx.handle_event(event);
                        let route = ctx.acknowledge_expiry()?;
                        println!("Session expired; log in again at {route}");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    guard.disarm();
                    println!("Stopped watching");
                }
            }
        }
    }
    Ok(())
}

async fn policy(config: &AppConfig, action: PolicyAction) -> Result<()> {
    let client = Arc::new(authed_client(config)?);
    let mut editor = PolicyEditor::new(client);
    editor.fetch_categories().await?;

    match action {
        PolicyAction::Show { org_type, role } => {
            let outcome = editor
                .fetch_assignment(OrgTypeId(org_type), RoleId(role))
                .await;
            println!(
                "Policy: {} ({outcome:?})",
                editor.policy_id().unwrap_or("unassigned")
            );
            for (category, keys) in editor.categories().iter() {
                println!("{category}");
                for key in keys {
                    let mark = if editor.checked().contains(key) { "x" } else { " " };
                    println!("  [{mark}] {key}");
                }
            }
        }
        PolicyAction::Set {
            org_type,
            role,
            category,
            keys,
        } => {
            editor
                .fetch_assignment(OrgTypeId(org_type), RoleId(role))
                .await;
            editor.toggle_category(&category, keys)?;

            let diff = editor.diff();
            match editor.save().await {
                Ok(policy) => {
                    println!(
                        "Saved policy {} (+{} -{})",
                        policy.id.as_deref().unwrap_or("-"),
                        diff.granted.len(),
                        diff.revoked.len()
                    );
                }
                Err(e) => {
                    let message = editor
                        .notice()
                        .map(|n| n.message.clone())
                        .unwrap_or_else(|| e.to_string());
                    bail!(message);
                }
            }
        }
    }
    Ok(())
}

async fn resources(config: &AppConfig, action: ResourceAction) -> Result<()> {
    let ResourceAction::List {
        resource,
        page,
        size,
    } = action;

    let resource = Resource::from_name(&resource).ok_or_else(|| {
        let known: Vec<_> = Resource::ALL.iter().map(Resource::name).collect();
        anyhow!("Unknown resource '{resource}' (known: {})", known.join(", "))
    })?;
    let client = authed_client(config)?;
    let request = PageRequest::new(page, size.unwrap_or(config.page_size));
    let page = client.list_page(resource, request).await?;

    println!(
        "{resource}: page {} ({} of {} rows)",
        request.page,
        page.data.len(),
        page.meta.total
    );
    for row in &page.data {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

async fn stats(config: &AppConfig, kind: StatsKind) -> Result<()> {
    let client = authed_client(config)?;
    let value = client.fetch_stats(kind.into()).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn sms(action: SmsAction) -> Result<()> {
    let SmsAction::Validate { file } = action;
    let report = validate_recipients_file(&file)
        .with_context(|| format!("Failed to check {}", file.display()))?;

    println!(
        "{} valid, {} invalid, {} duplicates",
        report.valid.len(),
        report.invalid.len(),
        report.duplicates
    );
    for bad in &report.invalid {
        println!("  line {}: '{}' {}", bad.line, bad.raw, bad.reason);
    }
    Ok(())
}

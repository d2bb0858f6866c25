//! `jamii-cli`: terminal access to the Jamii Clinic API.
//!
//! Runs the same session core as the dashboard: the token and selected clinic
//! persist in a JSON state file instead of `localStorage`, and every API call
//! goes through the authorized fetch, so a 401 ends the stored session here
//! exactly as it does in the browser.


mod state_file;

use std::io::{self, BufRead};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use session::account::{change_password, validate_login_input, validate_password_change};
use session::guard::{CHANGE_PASSWORD_PATH, HOME_PATH, evaluate};
use session::notify::LogNotifier;
use session::resource::ResourceKind;
use session::transport::ReqwestTransport;
use session::{
    ApiConfig, ClinicScope, FetchError, GuardState, RouteRequirement, SessionContext, SessionError, TransportError,
    User,
};
use tracing_subscriber::EnvFilter;

use crate::state_file::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `jamii-cli login`")]
    NotSignedIn,
    #[error("password change required; run `jamii-cli change-password`")]
    PasswordResetRequired,
    #[error("session expired; run `jamii-cli login`")]
    SessionExpired,
    #[error("{0}")]
    Invalid(&'static str),
    #[error("unknown clinic: {0}")]
    UnknownClinic(i64),
    #[error("invalid clinic id: {0}")]
    InvalidClinicId(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Fetch(FetchError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        if err.is_unauthorized() { Self::SessionExpired } else { Self::Fetch(err) }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jamii-cli", about = "Jamii Clinic API CLI")]
struct Cli {
    #[arg(long, env = "JAMII_API_BASE_URL", default_value = session::config::DEFAULT_API_BASE_URL)]
    base_url: String,

    #[arg(long, env = "JAMII_STATE_FILE", default_value = ".jamii-session.json")]
    state_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the access token.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "JAMII_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
    },
    Clinics(ClinicsCommand),
    Resource(ResourceCommand),
}

#[derive(Args, Debug)]
struct ClinicsCommand {
    #[command(subcommand)]
    command: ClinicsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ClinicsSubcommand {
    List,
    /// Select a clinic by id, or `all` (admins only).
    Select { clinic: String },
}

#[derive(Args, Debug)]
struct ResourceCommand {
    #[command(subcommand)]
    command: ResourceSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResourceSubcommand {
    List {
        kind: ResourceKind,
        /// Ignore the selected clinic.
        #[arg(long, default_value_t = false)]
        all_clinics: bool,
    },
    Get {
        kind: ResourceKind,
        id: String,
    },
    Create {
        kind: ResourceKind,
        #[arg(long)]
        data: String,
    },
    Update {
        kind: ResourceKind,
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        kind: ResourceKind,
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Timeouts come from the environment; the base URL from the flag.
    let api = ApiConfig { base_url: ApiConfig::new(&cli.base_url).base_url, ..ApiConfig::from_env() };
    let transport = ReqwestTransport::new(&api)?;
    let storage = FileStore::open(&cli.state_file);
    tracing::debug!(base_url = %api.base_url, state_file = %storage.path().display(), "starting");

    let ctx = SessionContext::new(api, Arc::new(transport), Arc::new(storage), Arc::new(LogNotifier));
    ctx.session.initialize();

    match cli.command {
        Command::Login { email, password } => run_login(&ctx, &email, password).await,
        Command::Logout => {
            ctx.session.logout();
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            let user = require_user(&ctx, HOME_PATH)?;
            print_json(&serde_json::to_value(&user)?)
        }
        Command::ChangePassword { current, new_password } => {
            run_change_password(&ctx, &current, &new_password).await
        }
        Command::Clinics(clinics) => run_clinics(&ctx, clinics).await,
        Command::Resource(resource) => run_resource(&ctx, resource).await,
    }
}

/// Current user, if the session may act on `path`.
fn require_user(ctx: &SessionContext, path: &str) -> Result<User, CliError> {
    let snapshot = ctx.session.snapshot();
    match evaluate(&snapshot, &RouteRequirement::any_role(), path) {
        GuardState::Unauthenticated | GuardState::Resolving => Err(CliError::NotSignedIn),
        GuardState::ForcedReset => Err(CliError::PasswordResetRequired),
        GuardState::Authorized | GuardState::Forbidden => snapshot.user.ok_or(CliError::NotSignedIn),
    }
}

async fn run_login(ctx: &SessionContext, email: &str, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(password) => password,
        None => read_line("Password: ")?,
    };
    let email = validate_login_input(email, &password).map_err(CliError::Invalid)?;
    let user = ctx.session.login(&email, &password).await?;
    println!("signed in as {} ({})", user.email, user.role);

    if user.must_change_password {
        println!("a password change is required before continuing");
        return Ok(());
    }
    let scope = ctx.refresh_scope().await;
    print_scope(&scope);
    Ok(())
}

async fn run_change_password(ctx: &SessionContext, current: &str, new_password: &str) -> Result<(), CliError> {
    require_user(ctx, CHANGE_PASSWORD_PATH)?;
    validate_password_change(current, new_password, new_password).map_err(CliError::Invalid)?;
    change_password(&ctx.fetch, current, new_password).await?;
    println!("password updated");
    Ok(())
}

async fn run_clinics(ctx: &SessionContext, clinics: ClinicsCommand) -> Result<(), CliError> {
    require_user(ctx, HOME_PATH)?;
    let scope = resolve_scope(ctx).await?;
    match clinics.command {
        ClinicsSubcommand::List => {
            print_scope(&scope);
            Ok(())
        }
        ClinicsSubcommand::Select { clinic } => {
            let requested = parse_clinic_arg(&clinic)?;
            if let Some(id) = requested {
                if scope.find(id).is_none() {
                    return Err(CliError::UnknownClinic(id));
                }
            }
            ctx.clinics.set_selection(requested);
            print_scope(&ctx.clinics.scope());
            Ok(())
        }
    }
}

async fn run_resource(ctx: &SessionContext, resource: ResourceCommand) -> Result<(), CliError> {
    require_user(ctx, HOME_PATH)?;
    let client = &ctx.resources;
    match resource.command {
        ResourceSubcommand::List { kind, all_clinics } => {
            let clinic_id = if all_clinics { None } else { resolve_scope(ctx).await?.selected_id() };
            let rows = client.list(kind, clinic_id).await?;
            print_json(&Value::Array(rows))
        }
        ResourceSubcommand::Get { kind, id } => print_json(&client.get(kind, &id).await?),
        ResourceSubcommand::Create { kind, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            print_json(&client.create(kind, &body).await?)
        }
        ResourceSubcommand::Update { kind, id, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            print_json(&client.update(kind, &id, &body).await?)
        }
        ResourceSubcommand::Delete { kind, id } => {
            client.delete(kind, &id).await?;
            println!("deleted {kind} {id}");
            Ok(())
        }
    }
}

/// Resolve the clinic scope; a 401 during resolution ends the session.
async fn resolve_scope(ctx: &SessionContext) -> Result<ClinicScope, CliError> {
    let scope = ctx.refresh_scope().await;
    if ctx.session.user().is_none() {
        return Err(CliError::SessionExpired);
    }
    Ok(scope)
}

/// `all` (or empty) clears the selection; anything else must be an id.
fn parse_clinic_arg(raw: &str) -> Result<Option<i64>, CliError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| CliError::InvalidClinicId(raw.to_owned()))
}

/// One line per clinic, the selected one marked with `*`.
fn render_scope(scope: &ClinicScope) -> Vec<String> {
    let selected = scope.selected_id();
    scope
        .clinics
        .iter()
        .map(|clinic| {
            let marker = if Some(clinic.clinic_id) == selected { '*' } else { ' ' };
            format!("{marker} {:>5}  {}", clinic.clinic_id, clinic.clinic_name)
        })
        .collect()
}

fn print_scope(scope: &ClinicScope) {
    if scope.clinics.is_empty() {
        println!("no clinics available");
        return;
    }
    for line in render_scope(scope) {
        println!("{line}");
    }
}

fn read_line(prompt: &str) -> Result<String, CliError> {
    eprint!("{prompt}");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

//! sodan server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the registry API over HTTP.
//!
//! # Bootstrapping a staff account
//!
//! The API requires staff credentials for everything, so the first account
//! is created from the command line:
//!
//! ```
//! cargo run -p sodan-server -- --create-staff alice --role admin
//! ```
//!
//! # Password hash generation
//!
//! To print the argon2 PHC string for a password entered on stdin:
//!
//! ```
//! cargo run -p sodan-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use sodan_api::AppState;
use sodan_core::{
  credential::{CredentialService, SecretHasher},
  notify::Notifier,
  staff::{NewStaffUser, Role},
  store::RegistryStore,
};
use sodan_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `SODAN_`-prefixed environment overrides.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("sodan.db") }

// ─── Notifier ─────────────────────────────────────────────────────────────────

/// Logs issued credentials instead of sending them anywhere. Stands in for a
/// mail transport until one is wired up; the plaintext secret deliberately
/// stays out of the log line.
struct LogNotifier;

impl Notifier for LogNotifier {
  type Error = std::convert::Infallible;

  async fn deliver_credentials(
    &self,
    to: &str,
    household_code: &str,
    _secret: &str,
  ) -> Result<(), Self::Error> {
    tracing::info!(%to, %household_code, "credentials issued");
    Ok(())
  }
}

// ─── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Household registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create a staff account with this username (password read from stdin)
  /// and exit.
  #[arg(long, value_name = "USERNAME")]
  create_staff: Option<String>,

  /// Role for `--create-staff`: staff, manager or admin.
  #[arg(long, default_value = "staff")]
  role: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let hash = SecretHasher::default()
      .hash(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SODAN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: bootstrap a staff account and exit.
  if let Some(username) = cli.create_staff {
    let role = parse_role(&cli.role)?;
    let password = read_password()?;
    let hash = SecretHasher::default()
      .hash(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    let staff = store
      .add_staff(NewStaffUser {
        username:      username.clone(),
        display_name:  username,
        role,
        password_hash: hash,
      })
      .await
      .context("failed to create staff account")?;
    println!("created {} ({:?})", staff.username, staff.role);
    return Ok(());
  }

  // Build application state.
  let store = Arc::new(store);
  let credentials = Arc::new(
    CredentialService::new(Arc::clone(&store), Arc::new(LogNotifier))
      .map_err(|e| anyhow::anyhow!("credential service init: {e}"))?,
  );
  let state = AppState { store, credentials };

  let app = sodan_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn parse_role(s: &str) -> anyhow::Result<Role> {
  match s {
    "staff" => Ok(Role::Staff),
    "manager" => Ok(Role::Manager),
    "admin" => Ok(Role::Admin),
    other => anyhow::bail!("unknown role {other:?}"),
  }
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

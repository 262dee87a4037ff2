//! nonassoc-server binary.
//!
//! Loads [`ServerConfig`] from a TOML file overlaid with `NONASSOC_*`
//! environment variables, opens the SQLite store and serves the API.
//!
//! `--hash-password` reads a password from stdin and prints the argon2 PHC
//! string to put in `auth_password_hash`.

use std::{
  io::{self, Read as _},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use nonassoc_api::AppState;
use nonassoc_core::clock::SystemClock;
use nonassoc_server::{ServerConfig, directory::HttpPrisonerDirectory};
use nonassoc_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Non-associations API server")]
struct Cli {
  /// TOML configuration file; missing keys fall back to `NONASSOC_*` env vars.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Hash the password read from stdin for `auth_password_hash`, then exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  if cli.hash_password {
    println!("{}", hash_stdin_password()?);
    return Ok(());
  }

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  serve(load_config(&cli.config)?).await
}

fn hash_stdin_password() -> anyhow::Result<String> {
  let mut input = String::new();
  io::stdin().read_to_string(&mut input).context("failed to read password from stdin")?;
  let password = input.trim_end_matches(['\n', '\r']);
  anyhow::ensure!(!password.is_empty(), "empty password");

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("NONASSOC"))
    .build()
    .and_then(config::Config::try_deserialize)
    .with_context(|| format!("invalid configuration in {} or NONASSOC_* env", path.display()))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let home = std::env::var_os("HOME").map(PathBuf::from);
  let store_path = cfg.resolved_store_path(home.as_deref());
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;
  let directory = HttpPrisonerDirectory::new(cfg.prisoner_search_url.clone())
    .context("failed to build prisoner search client")?;

  let state = AppState {
    store:           Arc::new(store),
    directory:       Arc::new(directory),
    clock:           Arc::new(SystemClock),
    system_username: cfg.system_username.as_str().into(),
  };
  let app = nonassoc_server::router(state, Arc::new(cfg.auth()));

  let address = cfg.listen_address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!(
    %address,
    store = %store_path.display(),
    prisoner_search_url = %cfg.prisoner_search_url,
    "non-associations server listening"
  );

  axum::serve(listener, app).await.context("server error")
}

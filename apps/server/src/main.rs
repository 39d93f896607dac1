use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::{fs, net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use agora_api::{build_router, AppState};
use agora_auth::{AuthError, Authenticator, Role};
use agora_config::{load as load_config, DatabaseConfig};

mod migrations {
    pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
}

#[derive(Parser)]
#[command(name = "agora-backend")]
#[command(about = "Agora community backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Create an admin account, or promote an existing one
    CreateAdmin {
        email: String,
        password: String,
        nickname: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::CreateAdmin {
            email,
            password,
            nickname,
        } => create_admin(&email, &password, &nickname).await,
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Agora backend");

    let config = load_config().context("failed to load configuration")?;

    let pool = prepare_database(&config.database).await?;

    migrations::MIGRATOR
        .run(&pool)
        .await
        .context("database migrations failed")?;

    let authenticator = Authenticator::new(pool.clone(), config.auth.clone());
    let state = AppState::new(pool, authenticator, &config.throttle);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn create_admin(email: &str, password: &str, nickname: &str) -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let pool = prepare_database(&config.database).await?;

    migrations::MIGRATOR
        .run(&pool)
        .await
        .context("database migrations failed")?;

    let authenticator = Authenticator::new(pool.clone(), config.auth.clone());

    let public_id = match authenticator.signup(email, password, nickname).await {
        Ok(user) => user.public_id,
        Err(AuthError::EmailExists) => {
            sqlx::query_scalar::<_, String>("SELECT public_id FROM users WHERE email = ?")
                .bind(email)
                .fetch_one(&pool)
                .await
                .context("failed to look up existing account")?
        }
        Err(err) => return Err(err).context("failed to create account"),
    };

    let user = authenticator
        .update_role(&public_id, Role::Admin)
        .await
        .context("failed to assign admin role")?;

    println!("{} ({}) is now an admin", user.nickname, user.email);
    Ok(())
}

async fn prepare_database(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("failed to enable foreign keys for sqlite")?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("failed to enable WAL mode for sqlite")?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await
        .context("failed to set busy timeout for sqlite")?;

    info!(url = %config.url, "database connection established");
    Ok(pool)
}

/// Ensure the SQLite database file and its directory exist.
async fn ensure_sqlite_path(url: &str) -> anyhow::Result<()> {
    let Some(sqlite_path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };

    if sqlite_path == ":memory:" {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}

fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    async {
        if let Err(err) = signal::ctrl_c().await {
            error!(?err, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
    }
}

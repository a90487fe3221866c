use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use runway_config::{Config, ConfigLoad, ConfigLoader};
use runway_core::{
    application::CapacityUnitOfWork,
    database::{InMemoryStore, PostgresDatabase},
    notify::{ChangeNotifier, LocalChangeNotifier, PgChangeNotifier},
};
use runway_server::{
    AppState, create_app, infra::websocket::ConnectionManager, relay::LiveUpdateRelay,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "runway-server")]
#[command(about = "Storage runway projections with a live change feed")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a runway.toml configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Serve a seeded in-memory store instead of PostgreSQL
    #[arg(long, env = "RUNWAY_IN_MEMORY", default_value_t = false)]
    in_memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        None => run_server(config, cli.serve.in_memory).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path.clone());
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

async fn connect_postgres(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let url = config
        .database
        .primary_url
        .as_deref()
        .context("no database URL configured; set DATABASE_URL or run with --in-memory")?;
    PostgresDatabase::new(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pg = connect_postgres(config).await?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let config = Arc::new(config);

    let (unit_of_work, notifier, postgres): (
        CapacityUnitOfWork,
        Arc<dyn ChangeNotifier>,
        Option<Arc<PostgresDatabase>>,
    ) = if in_memory {
        info!("serving seeded in-memory store");
        let notifier = LocalChangeNotifier::new();
        let store = InMemoryStore::seeded_demo(notifier.clone()).await;
        (CapacityUnitOfWork::in_memory(store), Arc::new(notifier), None)
    } else {
        let pg = connect_postgres(&config).await?;
        pg.initialize_schema()
            .await
            .context("database migration failed")?;
        let notifier = PgChangeNotifier::new(pg.pool().clone());
        (
            CapacityUnitOfWork::postgres(&pg),
            Arc::new(notifier),
            Some(Arc::new(pg)),
        )
    };

    let unit_of_work = Arc::new(unit_of_work);
    let websocket_manager = Arc::new(ConnectionManager::new());
    let relay = Arc::new(LiveUpdateRelay::new(
        unit_of_work.clone(),
        notifier,
        websocket_manager.clone(),
    ));
    relay
        .start()
        .await
        .context("failed to subscribe to change notifications")?;

    let state = AppState {
        unit_of_work,
        postgres,
        config: config.clone(),
        websocket_manager,
        relay: relay.clone(),
    };
    let router = create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting runway server on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    relay.stop().await;
    info!("runway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

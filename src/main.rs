//! coverage-node: ZIP code coverage lookup service
//!
//! Serves provider availability, coverage statistics and plan lookups over
//! HTTP from a pre-populated SQLite catalog. The `import` subcommand is the
//! only way rows get into the catalog.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use coverage_node::api::{create_router, AppState};
use coverage_node::db::CatalogFixture;
use coverage_node::{CatalogDb, Config, CoverageResolver};

#[derive(Parser)]
#[command(name = "coverage-node")]
#[command(about = "ZIP code coverage lookup service for internet and TV providers")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "coverage-node.toml")]
    config: PathBuf,

    /// SQLite catalog path (overrides config file)
    #[arg(long, env = "COVERAGE_DATABASE")]
    database: Option<PathBuf>,

    /// HTTP port (overrides config file)
    #[arg(long, env = "COVERAGE_HTTP_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Load providers, coverage and plans from a JSON fixture
    Import {
        /// Fixture file
        file: PathBuf,
    },
    /// Print the providers serving a ZIP code
    CheckZip {
        zip: String,
        #[arg(short, long)]
        technology: Option<String>,
    },
    /// Print catalog row counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coverage_node=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(port) = cli.port {
        config.api.http_port = port;
    }
    config.validate()?;

    info!("Catalog: {}", config.database.path.display());
    let db = Arc::new(CatalogDb::open(&config.database.path)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(db, &config).await,
        Command::Import { file } => {
            let fixture = CatalogFixture::from_file(&file)?;
            let report = db.import(&fixture)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::CheckZip { zip, technology } => {
            let resolver = CoverageResolver::from_catalog(db);
            let providers = resolver.resolve(&zip, technology.as_deref()).await?;

            if providers.is_empty() {
                println!("No providers found for ZIP {}", zip);
            }
            for p in &providers {
                println!("- {} ({})", p.name, p.slug);
                println!("  Category: {}", p.category);
                println!("  Technologies: {}", p.technologies.join(", "));
            }
            println!("Total: {} providers", providers.len());
            Ok(())
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&db.stats()?)?);
            Ok(())
        }
    }
}

async fn serve(db: Arc<CatalogDb>, config: &Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_catalog(db, &config.api));
    let app = create_router(state, config.api.request_timeout());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
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
}

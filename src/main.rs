use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use curator::catalog;
use curator::config::{DEFAULT_DB_PATH, ServerConfig};
use curator::server::{AppState, create_router};

#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Catalog server for harvested code assets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a harvested catalog into a store
    Ingest {
        /// Path to the asset catalog JSON
        catalog: String,

        /// Path to the output SQLite store
        out_db: String,

        /// Path to a published-modules catalog JSON
        #[arg(long)]
        modules: Option<String>,
    },

    /// Start the query API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Default store queried when a request carries no `db` override.
        /// Falls back to $CURATOR_DB, then to ./data/catalog.db.
        #[arg(long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("curator=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            catalog,
            out_db,
            modules,
        } => {
            let summary = catalog::ingest(
                Path::new(&catalog),
                modules.as_deref().map(Path::new),
                Path::new(&out_db),
            )?;
            println!(
                "Wrote database: {out_db} ({} repos, {} assets, {} modules)",
                summary.repos, summary.assets, summary.modules
            );
        }
        Commands::Serve { host, port, db } => {
            let db_path = db
                .or_else(|| std::env::var("CURATOR_DB").ok())
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

            let config = ServerConfig {
                host,
                port,
                db_path: PathBuf::from(db_path),
            };

            if !config.db_path.exists() {
                warn!(
                    "default store {} does not exist; queries without a db override will fail",
                    config.db_path.display()
                );
            }

            let state = Arc::new(AppState {
                db_path: config.db_path.clone(),
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

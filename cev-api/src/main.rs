//! cev-api - Chemical Equipment Visualizer HTTP API
//!
//! Serves CSV upload, upload history and PDF report endpoints backed by a
//! SQLite database in the resolved root folder.

use anyhow::{Context, Result};
use cev_common::api::upsert_user;
use cev_common::config::{load_default_toml_config, RootFolderInitializer, RootFolderResolver};
use cev_common::db::init_database;
use cev_api::{build_router, AppState};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "cev-api", version, about = "Chemical Equipment Visualizer API server")]
struct Cli {
    /// Folder holding cev.db (overrides CEV_ROOT_FOLDER and config.toml)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen address, e.g. 127.0.0.1:8000
        #[arg(long, env = "CEV_BIND_ADDRESS")]
        bind: Option<String>,

        /// Accept requests without credentials
        #[arg(long)]
        no_auth: bool,
    },
    /// Create a user, or reset an existing user's password
    CreateUser {
        #[arg(default_value = "admin")]
        username: String,

        #[arg(long, env = "CEV_USER_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Chemical Equipment Visualizer API (cev-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let toml_config = load_default_toml_config();

    let resolver = RootFolderResolver::new("cev-api")
        .with_cli_arg(cli.root_folder.clone())
        .with_toml_config(toml_config.clone());
    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match cli.command.unwrap_or(Command::Serve {
        bind: None,
        no_auth: false,
    }) {
        Command::CreateUser { username, password } => {
            let created = upsert_user(&pool, &username, &password).await?;
            if created {
                info!("✓ Created user '{}'", username);
            } else {
                info!("✓ Password updated for user '{}'", username);
            }
            Ok(())
        }
        Command::Serve { bind, no_auth } => {
            if no_auth {
                warn!("API authentication disabled (--no-auth)");
            }

            let state = AppState::new(pool, !no_auth);
            let app = build_router(state);

            let bind = bind.unwrap_or_else(|| toml_config.bind_address_or_default());
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("Failed to bind {}", bind))?;
            info!("cev-api listening on http://{}", bind);
            info!("Health check: http://{}/health", bind);

            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}

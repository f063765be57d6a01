use std::{env, str::FromStr, sync::Arc, time::Duration};

use colored::Colorize;
use log::{error, info, warn};
use signage_collab::{Database, DatabaseError, EventRegistry, MemoryDatabase, PgDatabase, Signage};
use signage_core::Config;
use signage_server::{run_server, DEFAULT_PORT};
use thiserror::Error;

mod logging;

/// Everything read from the environment on startup
struct Settings {
    port: u16,
    database_url: Option<String>,
    config: Config,
}

#[derive(Debug, Error)]
enum LaunchError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidVariable { name: &'static str, value: String },

    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),

    #[error("Server stopped: {0}")]
    Server(#[from] std::io::Error),
}

impl LaunchError {
    fn hint(&self) -> &'static str {
        match self {
            LaunchError::InvalidVariable { .. } => {
                "Check the environment variables and the .env file, then try again."
            }
            LaunchError::Database(_) => {
                "Make sure SIGNAGE_DATABASE_URL points to a running Postgres instance, or unset it to keep everything in memory."
            }
            LaunchError::Server(_) => "Make sure the port is not already in use.",
        }
    }
}

impl Settings {
    fn from_env() -> Result<Self, LaunchError> {
        let defaults = Config::default();

        let port = number("SIGNAGE_SERVER_PORT")?.unwrap_or(DEFAULT_PORT);
        let keep_alive = number("SIGNAGE_KEEP_ALIVE_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.keep_alive_interval);
        let slide_duration = number("SIGNAGE_DEFAULT_SLIDE_DURATION")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_slide_duration);

        Ok(Self {
            port,
            database_url: env::var("SIGNAGE_DATABASE_URL").ok(),
            config: Config {
                default_slide_duration: slide_duration,
                keep_alive_interval: keep_alive,
                default_creator: env::var("SIGNAGE_DEFAULT_CREATOR")
                    .unwrap_or(defaults.default_creator),
            },
        })
    }
}

fn number<T: FromStr>(name: &'static str) -> Result<Option<T>, LaunchError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LaunchError::InvalidVariable { name, value }),
        Err(_) => Ok(None),
    }
}

async fn launch() -> Result<(), LaunchError> {
    let settings = Settings::from_env()?;

    let database: Arc<dyn Database> = match &settings.database_url {
        Some(url) => {
            info!("Connecting to database...");
            Arc::new(PgDatabase::new(url).await?)
        }
        None => {
            warn!("SIGNAGE_DATABASE_URL is not set, data is kept in memory only");
            Arc::new(MemoryDatabase::new())
        }
    };

    let signage = Signage::new(database, EventRegistry::new(), settings.config);

    info!("Initialized successfully.");
    run_server(signage, settings.port).await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Could not read .env file: {}", e);
        }
    }

    if let Err(e) = logging::init_logger() {
        eprintln!("Could not initialize logging: {}", e);
    }

    if let Err(error) = launch().await {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "signage failed to start!".bold().red()
        );
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());

        std::process::exit(1);
    }
}

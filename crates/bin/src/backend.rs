//! Store creation and persistence helpers.

use std::path::PathBuf;
use std::sync::Arc;

use binder::backend::{
    IdentityStore,
    database::{InMemory, Postgres, Sqlite},
};

use crate::cli::{Backend, BackendConfig};

const SQLITE_FILE: &str = "binder.db";
const JSON_FILE: &str = "binder.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

fn data_dir(config: &BackendConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Human-readable description of the configured backend
pub fn backend_label(config: &BackendConfig) -> String {
    match config.backend {
        Backend::Sqlite => format!("sqlite ({})", data_dir(config).join(SQLITE_FILE).display()),
        Backend::Postgres => match &config.postgres_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
        Backend::Inmemory => format!("inmemory ({})", data_dir(config).join(JSON_FILE).display()),
    }
}

/// Create the appropriate store based on configuration
pub async fn create_store(
    config: &BackendConfig,
) -> Result<Arc<dyn IdentityStore>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(config);

    match config.backend {
        Backend::Sqlite => {
            tokio::fs::create_dir_all(&data_dir).await?;
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Arc::new(Sqlite::open(&db_path).await?))
        }
        Backend::Postgres => {
            let url = config
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or BINDER_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match Postgres::connect(url).await {
                Ok(store) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(store))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        Backend::Inmemory => {
            let json_path = data_dir.join(JSON_FILE);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            // A missing file loads as an empty store; any other failure is fatal.
            match InMemory::load_from_file(&json_path).await {
                Ok(store) => Ok(Arc::new(store)),
                Err(e) => Err(format!("Refusing to load {}: {}", json_path.display(), e).into()),
            }
        }
    }
}

/// Write the store back to disk after a mutating command.
///
/// Only the InMemory store needs this; SQL stores persist on every write.
pub async fn persist_store(
    store: &Arc<dyn IdentityStore>,
    config: &BackendConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(in_memory) = store.as_any().downcast_ref::<InMemory>() {
        let data_dir = data_dir(config);
        tokio::fs::create_dir_all(&data_dir).await?;
        let json_path = data_dir.join(JSON_FILE);
        in_memory.save_to_file(&json_path).await?;
        tracing::info!("Store saved to {}", json_path.display());
    }
    Ok(())
}

//! SQL-based identity stores.
//!
//! This module provides an `IdentityStore` backed by a relational database.
//!
//! ## Available Backends
//!
//! - **SQLite** (feature: `sqlite`): Embedded database
//! - **PostgreSQL** (feature: `postgres`): PostgreSQL database
//!
//! ## Architecture
//!
//! The SQL store uses sqlx with `AnyPool` for multi-database support. Group
//! saves run inside a single transaction, and the membership table is keyed by
//! (subject, issuer), which both indexes the lookup used by the consistency
//! check and makes exclusive membership a database constraint.

mod storage;

/// Schema definition and version check.
pub mod schema;

use std::any::Any;
#[cfg(feature = "postgres")]
use std::time::Duration;

use async_trait::async_trait;
use sqlx::AnyPool;
#[cfg(feature = "postgres")]
use sqlx::Executor;
use sqlx::any::AnyPoolOptions;

use crate::Result;
use crate::backend::IdentityStore;
use crate::backend::errors::BackendError;
use crate::identity::{GroupId, MultipleIdentity, SingleIdentity};

/// Extension trait for sqlx Result types to simplify error handling.
///
/// Similar to `anyhow::Context`, this trait adds a method to convert
/// sqlx errors to `BackendError::SqlxError` with a context message.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to BackendError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

/// SQL-based store implementing `IdentityStore` using sqlx.
///
/// Works against SQLite or PostgreSQL through sqlx's `AnyPool`; every SQL
/// statement in `storage` is written to run unchanged on both. Use the
/// [`Sqlite`] and [`Postgres`] aliases to pick the constructors.
pub struct SqlxStore {
    pool: AnyPool,
}

impl SqlxStore {
    /// The underlying connection pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Wraps a configured pool and brings its schema up to date.
    async fn from_pool(pool: AnyPool) -> Result<Self> {
        let store = Self { pool };
        schema::initialize(&store).await?;
        Ok(store)
    }
}

/// Connection settings applied to every SQLite file database.
#[cfg(feature = "sqlite")]
const SQLITE_FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA busy_timeout = 5000;";

#[cfg(feature = "sqlite")]
impl SqlxStore {
    /// Open (creating if needed) the SQLite database file at `path`.
    ///
    /// ```ignore
    /// let store = binder::backend::database::Sqlite::open("binder.db").await?;
    /// ```
    pub async fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::connect_sqlite(&format!("sqlite:{}?mode=rwc", path.as_ref().display())).await
    }

    /// Connect with a SQLite URL such as `sqlite:./binder.db`.
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        // A shared-cache memory database disappears with its last connection,
        // so one connection is pinned open for the life of the pool.
        let in_memory = url.contains("mode=memory");
        let mut options = AnyPoolOptions::new().max_connections(5);
        if in_memory {
            options = options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options
            .connect(url)
            .await
            .sql_context("Failed to open SQLite database")?;

        let pragmas = if in_memory {
            "PRAGMA busy_timeout = 5000;"
        } else {
            SQLITE_FILE_PRAGMAS
        };
        sqlx::query(pragmas)
            .execute(&pool)
            .await
            .sql_context("Failed to apply SQLite pragmas")?;

        Self::from_pool(pool).await
    }

    /// A private in-memory SQLite database, gone when the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        let name = uuid::Uuid::new_v4();
        Self::connect_sqlite(&format!("sqlite:file:binder_{name}?mode=memory&cache=shared")).await
    }
}

#[cfg(feature = "postgres")]
impl SqlxStore {
    /// Connect to PostgreSQL using the server's default search path.
    pub async fn connect(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;
        Self::from_pool(pool).await
    }

    /// Connect to PostgreSQL inside a freshly created schema of its own.
    ///
    /// Each call sees an empty store, so parallel tests against one server
    /// stay independent.
    pub async fn connect_isolated(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();
        // Schema names must start with a letter
        let schema = format!("binder_{}", uuid::Uuid::new_v4().simple());

        let setup = AnyPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;
        let create = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
        sqlx::query(&create)
            .execute(&setup)
            .await
            .sql_context(&format!("Failed to create schema {schema}"))?;
        setup.close().await;

        let search_path = format!("SET search_path TO {schema}");
        let pool = AnyPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;
        Self::from_pool(pool).await
    }
}

#[async_trait]
impl IdentityStore for SqlxStore {
    async fn find_by_subject_and_issuer(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<SingleIdentity>> {
        storage::find_single(self, subject, issuer).await
    }

    async fn find_all(&self) -> Result<Vec<MultipleIdentity>> {
        storage::find_all(self).await
    }

    async fn save(&self, group: MultipleIdentity) -> Result<MultipleIdentity> {
        storage::save_group(self, group).await
    }

    async fn save_single(&self, identity: SingleIdentity) -> Result<SingleIdentity> {
        storage::save_single(self, identity).await
    }

    async fn list_singles(&self) -> Result<Vec<SingleIdentity>> {
        storage::list_singles(self).await
    }

    async fn get_group(&self, id: GroupId) -> Result<MultipleIdentity> {
        storage::get_group(self, id).await
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        storage::delete_group(self, id).await
    }

    async fn find_group_by_member(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<MultipleIdentity>> {
        storage::find_group_by_member(self, subject, issuer).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(feature = "sqlite")]
/// Convenience type alias for SQLite store using sqlx.
pub type Sqlite = SqlxStore;

#[cfg(feature = "postgres")]
/// Convenience type alias for PostgreSQL store using sqlx.
pub type Postgres = SqlxStore;

//! SQL schema definitions.
//!
//! The schema is portable between SQLite and Postgres. Exclusive group
//! membership is enforced by the primary key of `identity_memberships`: an
//! identity row can point at only one group.

use crate::Result;
use crate::backend::errors::BackendError;

use super::SqlxStore;

/// Current schema version.
///
/// A database stamped with any other version is refused.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statements to create the schema tables.
pub const CREATE_TABLES: &[&str] = &[
    // BIGINT (64-bit) used for portability between SQLite and PostgreSQL
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // One row per federated login, bound or not
    "CREATE TABLE IF NOT EXISTS single_identities (
        subject TEXT NOT NULL,
        issuer TEXT NOT NULL,
        PRIMARY KEY (subject, issuer)
    )",
    // Merged groups; ids are assigned by the store
    "CREATE TABLE IF NOT EXISTS multiple_identities (
        id BIGINT PRIMARY KEY
    )",
    // Last group id handed out; only ever increases so deleted ids are never reused
    "CREATE TABLE IF NOT EXISTS group_id_seq (
        last_id BIGINT NOT NULL
    )",
    // Membership index: (subject, issuer) -> owning group
    "CREATE TABLE IF NOT EXISTS identity_memberships (
        subject TEXT NOT NULL,
        issuer TEXT NOT NULL,
        group_id BIGINT NOT NULL,
        PRIMARY KEY (subject, issuer)
    )",
];

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_identity_memberships_group ON identity_memberships(group_id)",
];

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist and checks the stored
/// schema version.
pub async fn initialize(store: &SqlxStore) -> Result<()> {
    let pool = store.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    if row.is_none() {
        sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
            .bind(SCHEMA_VERSION)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to initialize schema version: {e}"),
                source: Some(e),
            })?;
    } else if let Some((current_version,)) = row
        && current_version != SCHEMA_VERSION
    {
        return Err(BackendError::InvalidData {
            reason: format!(
                "Database schema version {current_version} is not supported (expected {SCHEMA_VERSION})"
            ),
        }
        .into());
    }

    let seq: Option<(i64,)> = sqlx::query_as("SELECT last_id FROM group_id_seq")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to read group id sequence: {e}"),
            source: Some(e),
        })?;
    if seq.is_none() {
        sqlx::query(
            "INSERT INTO group_id_seq (last_id) SELECT COALESCE(MAX(id), 0) FROM multiple_identities",
        )
        .execute(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to seed group id sequence: {e}"),
            source: Some(e),
        })?;
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Index creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    Ok(())
}

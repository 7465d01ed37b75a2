//! Identity storage operations for SQL backends.

use std::collections::BTreeMap;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::identity::{GroupId, MultipleIdentity, SingleIdentity};

use super::{SqlxResultExt, SqlxStore};

fn to_group_id(raw: i64) -> Result<GroupId> {
    u64::try_from(raw).map(GroupId::new).map_err(|_| {
        BackendError::InvalidData {
            reason: format!("negative group id {raw}"),
        }
        .into()
    })
}

fn to_db_id(id: GroupId) -> Result<i64> {
    i64::try_from(id.get()).map_err(|_| {
        BackendError::InvalidData {
            reason: format!("group id {id} does not fit in BIGINT"),
        }
        .into()
    })
}

/// Get a single identity by subject and issuer.
pub async fn find_single(
    store: &SqlxStore,
    subject: &str,
    issuer: &str,
) -> Result<Option<SingleIdentity>> {
    let row: Option<(String, String)> = sqlx::query_as(
        "SELECT subject, issuer FROM single_identities WHERE subject = $1 AND issuer = $2",
    )
    .bind(subject)
    .bind(issuer)
    .fetch_optional(store.pool())
    .await
    .sql_context("Failed to get single identity")?;

    Ok(row.map(|(subject, issuer)| SingleIdentity::new(subject, issuer)))
}

/// Record a single identity if it doesn't exist yet.
pub async fn save_single(store: &SqlxStore, identity: SingleIdentity) -> Result<SingleIdentity> {
    sqlx::query(
        "INSERT INTO single_identities (subject, issuer) VALUES ($1, $2)
         ON CONFLICT (subject, issuer) DO NOTHING",
    )
    .bind(identity.subject())
    .bind(identity.issuer())
    .execute(store.pool())
    .await
    .sql_context("Failed to insert single identity")?;

    Ok(identity)
}

/// List every single identity, bound or not.
pub async fn list_singles(store: &SqlxStore) -> Result<Vec<SingleIdentity>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT subject, issuer FROM single_identities ORDER BY subject, issuer")
            .fetch_all(store.pool())
            .await
            .sql_context("Failed to list single identities")?;

    Ok(rows
        .into_iter()
        .map(|(subject, issuer)| SingleIdentity::new(subject, issuer))
        .collect())
}

/// Load every group with its members.
pub async fn find_all(store: &SqlxStore) -> Result<Vec<MultipleIdentity>> {
    let pool = store.pool();

    let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM multiple_identities ORDER BY id")
        .fetch_all(pool)
        .await
        .sql_context("Failed to list groups")?;

    let mut groups = BTreeMap::new();
    for (raw,) in ids {
        let id = to_group_id(raw)?;
        let mut group = MultipleIdentity::new();
        group.set_id(id);
        groups.insert(id, group);
    }

    let members: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT subject, issuer, group_id FROM identity_memberships")
            .fetch_all(pool)
            .await
            .sql_context("Failed to list memberships")?;

    for (subject, issuer, raw) in members {
        let id = to_group_id(raw)?;
        let group = groups.get_mut(&id).ok_or_else(|| BackendError::InvalidData {
            reason: format!("membership of {subject}@{issuer} points at missing group {id}"),
        })?;
        group.insert(SingleIdentity::new(subject, issuer));
    }

    Ok(groups.into_values().collect())
}

/// Load one group by id.
pub async fn get_group(store: &SqlxStore, id: GroupId) -> Result<MultipleIdentity> {
    let pool = store.pool();
    let db_id = to_db_id(id)?;

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM multiple_identities WHERE id = $1")
        .bind(db_id)
        .fetch_optional(pool)
        .await
        .sql_context("Failed to get group")?;
    if exists.is_none() {
        return Err(BackendError::GroupNotFound { id }.into());
    }

    let members: Vec<(String, String)> = sqlx::query_as(
        "SELECT subject, issuer FROM identity_memberships WHERE group_id = $1",
    )
    .bind(db_id)
    .fetch_all(pool)
    .await
    .sql_context("Failed to get group members")?;

    let mut group = MultipleIdentity::with_identities(
        members
            .into_iter()
            .map(|(subject, issuer)| SingleIdentity::new(subject, issuer)),
    );
    group.set_id(id);
    Ok(group)
}

/// Find the group owning (subject, issuer) through the membership index.
pub async fn find_group_by_member(
    store: &SqlxStore,
    subject: &str,
    issuer: &str,
) -> Result<Option<MultipleIdentity>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT group_id FROM identity_memberships WHERE subject = $1 AND issuer = $2",
    )
    .bind(subject)
    .bind(issuer)
    .fetch_optional(store.pool())
    .await
    .sql_context("Failed to look up membership")?;

    match row {
        Some((raw,)) => Ok(Some(get_group(store, to_group_id(raw)?).await?)),
        None => Ok(None),
    }
}

/// Create or update a group and its memberships in one transaction.
pub async fn save_group(store: &SqlxStore, mut group: MultipleIdentity) -> Result<MultipleIdentity> {
    let mut tx = store
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    if let Some(id) = group.id() {
        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM multiple_identities WHERE id = $1")
                .bind(to_db_id(id)?)
                .fetch_optional(&mut *tx)
                .await
                .sql_context("Failed to check group")?;
        if exists.is_none() {
            return Err(BackendError::GroupNotFound { id }.into());
        }
    }

    for member in group.identities() {
        let owner: Option<(i64,)> = sqlx::query_as(
            "SELECT group_id FROM identity_memberships WHERE subject = $1 AND issuer = $2",
        )
        .bind(member.subject())
        .bind(member.issuer())
        .fetch_optional(&mut *tx)
        .await
        .sql_context("Failed to check membership")?;

        if let Some((raw,)) = owner {
            let existing = to_group_id(raw)?;
            if Some(existing) != group.id() {
                return Err(BackendError::MembershipConflict {
                    identity: member.clone(),
                    existing,
                }
                .into());
            }
        }
    }

    let id = match group.id() {
        Some(id) => id,
        None => {
            // The UPDATE takes the row lock first, so concurrent writers queue
            // behind it and never read the same value.
            sqlx::query("UPDATE group_id_seq SET last_id = last_id + 1")
                .execute(&mut *tx)
                .await
                .sql_context("Failed to allocate group id")?;
            let (next,): (i64,) = sqlx::query_as("SELECT last_id FROM group_id_seq")
                .fetch_one(&mut *tx)
                .await
                .sql_context("Failed to read allocated group id")?;
            sqlx::query("INSERT INTO multiple_identities (id) VALUES ($1)")
                .bind(next)
                .execute(&mut *tx)
                .await
                .sql_context("Failed to insert group")?;
            to_group_id(next)?
        }
    };
    let db_id = to_db_id(id)?;

    sqlx::query("DELETE FROM identity_memberships WHERE group_id = $1")
        .bind(db_id)
        .execute(&mut *tx)
        .await
        .sql_context("Failed to clear memberships")?;

    for member in group.identities() {
        sqlx::query(
            "INSERT INTO single_identities (subject, issuer) VALUES ($1, $2)
             ON CONFLICT (subject, issuer) DO NOTHING",
        )
        .bind(member.subject())
        .bind(member.issuer())
        .execute(&mut *tx)
        .await
        .sql_context("Failed to insert single identity")?;

        sqlx::query(
            "INSERT INTO identity_memberships (subject, issuer, group_id) VALUES ($1, $2, $3)",
        )
        .bind(member.subject())
        .bind(member.issuer())
        .bind(db_id)
        .execute(&mut *tx)
        .await
        .sql_context("Failed to insert membership")?;
    }

    tx.commit().await.sql_context("Failed to commit group")?;

    group.set_id(id);
    tracing::debug!(group = %id, members = group.len(), "Saved group");
    Ok(group)
}

/// Delete a group, leaving its members unbound.
pub async fn delete_group(store: &SqlxStore, id: GroupId) -> Result<()> {
    let db_id = to_db_id(id)?;
    let mut tx = store
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM identity_memberships WHERE group_id = $1")
        .bind(db_id)
        .execute(&mut *tx)
        .await
        .sql_context("Failed to delete memberships")?;

    let deleted = sqlx::query("DELETE FROM multiple_identities WHERE id = $1")
        .bind(db_id)
        .execute(&mut *tx)
        .await
        .sql_context("Failed to delete group")?;

    if deleted.rows_affected() == 0 {
        return Err(BackendError::GroupNotFound { id }.into());
    }

    tx.commit().await.sql_context("Failed to commit group deletion")?;
    Ok(())
}

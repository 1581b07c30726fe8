//! Post-write uniqueness enforcement for article identity.
//!
//! # Responsibility
//! - Run one article write inside an `IMMEDIATE` transaction.
//! - After the write, verify that neither the new `id` nor the new `title`
//!   matches any other record's `id` or `title` in the same namespace.
//! - Commit only when both checks pass; otherwise roll back.
//!
//! # Invariants
//! - Per write: `Pending -> Committed | RolledBack`, never retried.
//! - The write and its check share one transaction holding the database
//!   write lock, so two concurrent writers of the same key cannot both pass.
//! - Only the namespace of the written record is checked; a move across
//!   namespaces is validated against its destination.

use crate::model::article::ArticleData;
use crate::repo::article_repo::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::fmt::{Display, Formatter};

/// Lifecycle of one guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    Pending,
    Committed,
    RolledBack,
}

impl WriteState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Which identity key collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKey {
    Id,
    Title,
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Title => f.write_str("title"),
        }
    }
}

/// Details of a failed uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityViolation {
    pub namespace: String,
    pub key: IdentityKey,
    pub value: String,
    /// Records (including the written one) whose id or title equals `value`.
    pub matches: u32,
}

impl Display for IntegrityViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "article {} `{}` collides with {} other record(s) in namespace `{}`",
            self.key,
            self.value,
            self.matches.saturating_sub(1),
            self.namespace
        )
    }
}

/// Counts records in `namespace` whose `article_id` or `title` equals `name`.
pub fn count_name_matches(conn: &Connection, namespace: &str, name: &str) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COUNT(*)
         FROM articles
         WHERE namespace = ?1
           AND (article_id = ?2 OR title = ?2);",
        params![namespace, name],
        |row| row.get(0),
    )
}

/// Verifies that the post-write identity of `data` is unique.
///
/// Must run after the write, inside the same transaction.
pub fn enforce_unique_identity(conn: &Connection, data: &ArticleData) -> RepoResult<()> {
    if let Some(id) = data.id.as_deref() {
        check_key(conn, &data.namespace, IdentityKey::Id, id)?;
    }
    check_key(conn, &data.namespace, IdentityKey::Title, &data.title)
}

fn check_key(conn: &Connection, namespace: &str, key: IdentityKey, value: &str) -> RepoResult<()> {
    let matches = count_name_matches(conn, namespace, value)?;
    debug!(
        "event=uniqueness_check module=repo namespace={} key={} matches={}",
        namespace, key, matches
    );
    if matches > 1 {
        return Err(RepoError::IntegrityViolation(IntegrityViolation {
            namespace: namespace.to_string(),
            key,
            value: value.to_string(),
            matches,
        }));
    }
    Ok(())
}

/// Runs `write` and the uniqueness check for `identity` atomically.
///
/// `write` performs the mutation and may read back inside the transaction.
/// Any error from `write` or the check rolls the whole transaction back.
pub fn guarded_write<T>(
    conn: &mut Connection,
    operation: &'static str,
    identity: &ArticleData,
    write: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut state = WriteState::Pending;
    debug!(
        "event=article_write module=repo op={} status={} namespace={}",
        operation,
        state.as_str(),
        identity.namespace
    );

    let outcome = write(&tx).and_then(|value| {
        enforce_unique_identity(&tx, identity)?;
        Ok(value)
    });

    match outcome {
        Ok(value) => {
            tx.commit()?;
            state = WriteState::Committed;
            info!(
                "event=article_write module=repo op={} status={} namespace={}",
                operation,
                state.as_str(),
                identity.namespace
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=article_write module=repo op={} status=error error_code=rollback_failed error={}",
                    operation, rollback_err
                );
            }
            state = WriteState::RolledBack;
            warn!(
                "event=article_write module=repo op={} status={} namespace={} error={}",
                operation,
                state.as_str(),
                identity.namespace,
                err
            );
            Err(err)
        }
    }
}

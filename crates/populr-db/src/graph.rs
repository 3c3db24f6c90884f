//! Follow edges and direct messages.
//!
//! Every mutation checks current state first and reports the conflict as a
//! [`GraphError`] variant, so callers never have to interpret a storage-level
//! constraint violation.

use std::collections::BTreeSet;

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AccountRow, MessageRow};
use crate::queries::{ACCOUNT_COLUMNS, account_from_row, query_account_by_id};
use crate::{Database, OptionalExt};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("an account cannot follow itself")]
    SelfFollow,
    #[error("follow edge already exists")]
    AlreadyFollowing,
    #[error("follow edge does not exist")]
    NotFollowing,
    #[error("no account with id {0}")]
    UnknownAccount(Uuid),
    #[error("no message {0} for this recipient")]
    UnknownMessage(Uuid),
    #[error("message has no recipients")]
    NoRecipients,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

impl Database {
    // -- Follow edges --

    /// `follower` starts following `followed`. Returns the followed account.
    pub fn create_follow_edge(&self, followed: Uuid, follower: Uuid) -> GraphResult<AccountRow> {
        if followed == follower {
            return Err(GraphError::SelfFollow);
        }

        self.transaction(|tx| {
            let target = require_account(tx, followed)?;
            require_account(tx, follower)?;

            if edge_exists(tx, followed, follower)? {
                return Err(GraphError::AlreadyFollowing);
            }

            tx.execute(
                "INSERT INTO user_followers (user_id, follower_id) VALUES (?1, ?2)",
                (followed.to_string(), follower.to_string()),
            )?;
            Ok(target)
        })
    }

    /// `follower` stops following `followed`. Returns the formerly followed account.
    pub fn remove_follow_edge(&self, followed: Uuid, follower: Uuid) -> GraphResult<AccountRow> {
        self.transaction(|tx| {
            let target = require_account(tx, followed)?;

            if !edge_exists(tx, followed, follower)? {
                return Err(GraphError::NotFollowing);
            }

            tx.execute(
                "DELETE FROM user_followers WHERE user_id = ?1 AND follower_id = ?2",
                (followed.to_string(), follower.to_string()),
            )?;
            Ok(target)
        })
    }

    /// Accounts following `account_id`.
    pub fn list_followers(&self, account_id: Uuid) -> GraphResult<Vec<AccountRow>> {
        self.with_conn(|conn| {
            query_accounts(
                conn,
                "JOIN user_followers f ON f.follower_id = u.id WHERE f.user_id = ?1",
                account_id,
            )
        })
    }

    /// Accounts `account_id` follows.
    pub fn list_following(&self, account_id: Uuid) -> GraphResult<Vec<AccountRow>> {
        self.with_conn(|conn| {
            query_accounts(
                conn,
                "JOIN user_followers f ON f.user_id = u.id WHERE f.follower_id = ?1",
                account_id,
            )
        })
    }

    pub fn count_follow_edges(&self, followed: Uuid, follower: Uuid) -> GraphResult<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM user_followers WHERE user_id = ?1 AND follower_id = ?2",
                (followed.to_string(), follower.to_string()),
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    // -- Messages --

    /// Store a message for every distinct recipient. Returns the message as
    /// the sender sees it.
    pub fn send_message(
        &self,
        id: Uuid,
        sender: Uuid,
        recipients: &[Uuid],
        body: &str,
        kind: &str,
    ) -> GraphResult<MessageRow> {
        let recipients: BTreeSet<Uuid> = recipients.iter().copied().collect();
        if recipients.is_empty() {
            return Err(GraphError::NoRecipients);
        }

        self.transaction(|tx| {
            let author = require_account(tx, sender)?;
            for recipient in &recipients {
                require_account(tx, *recipient)?;
            }

            let message_id = id.to_string();
            tx.execute(
                "INSERT INTO messages (id, from_user_id, message, type) VALUES (?1, ?2, ?3, ?4)",
                (&message_id, &author.id, body, kind),
            )?;

            let mut insert = tx.prepare(
                "INSERT INTO message_to_users (message_id, user_id) VALUES (?1, ?2)",
            )?;
            for recipient in &recipients {
                insert.execute((&message_id, recipient.to_string()))?;
            }

            let created_at: String = tx.query_row(
                "SELECT created_at FROM messages WHERE id = ?1",
                [&message_id],
                |row| row.get(0),
            )?;

            Ok(MessageRow {
                id: message_id,
                sender_id: author.id,
                sender_username: author.username,
                body: body.to_string(),
                kind: kind.to_string(),
                read: false,
                created_at,
            })
        })
    }

    /// Messages addressed to `recipient`, newest first, with that recipient's
    /// read flag.
    pub fn list_messages(&self, recipient: Uuid) -> GraphResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.from_user_id, u.username, m.message, m.type, r.read, m.created_at
                 FROM message_to_users r
                 JOIN messages m ON m.id = r.message_id
                 LEFT JOIN users u ON u.id = m.from_user_id
                 WHERE r.user_id = ?1
                 ORDER BY m.created_at DESC, m.rowid DESC",
            )?;

            let rows = stmt
                .query_map([recipient.to_string()], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        sender_id: row.get(1)?,
                        sender_username: row
                            .get::<_, Option<String>>(2)?
                            .unwrap_or_else(|| "unknown".to_string()),
                        body: row.get(3)?,
                        kind: row.get(4)?,
                        read: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Set the read flag on `recipient`'s copy of a message. Other
    /// recipients' flags are untouched.
    pub fn mark_read(&self, message_id: Uuid, recipient: Uuid) -> GraphResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE message_to_users SET read = 1 WHERE message_id = ?1 AND user_id = ?2",
                (message_id.to_string(), recipient.to_string()),
            )?;
            if changed == 0 {
                return Err(GraphError::UnknownMessage(message_id));
            }
            Ok(())
        })
    }
}

fn require_account(conn: &Connection, id: Uuid) -> GraphResult<AccountRow> {
    query_account_by_id(conn, &id.to_string())?.ok_or(GraphError::UnknownAccount(id))
}

fn edge_exists(conn: &Connection, followed: Uuid, follower: Uuid) -> GraphResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM user_followers WHERE user_id = ?1 AND follower_id = ?2 LIMIT 1",
            (followed.to_string(), follower.to_string()),
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn query_accounts(conn: &Connection, clause: &str, id: Uuid) -> GraphResult<Vec<AccountRow>> {
    let columns = ACCOUNT_COLUMNS
        .split(", ")
        .map(|c| format!("u.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT {columns} FROM users u {clause} ORDER BY u.username ASC"
    ))?;
    let rows = stmt
        .query_map([id.to_string()], account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

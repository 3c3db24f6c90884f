use anyhow::Result;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::models::AccountRow;
use crate::{Database, OptionalExt};

pub(crate) const ACCOUNT_COLUMNS: &str =
    "id, username, password, device_token, phone_number, new_token, created_at";

impl Database {
    // -- Accounts --

    /// Insert a new account. Returns `None` when the username is already
    /// taken; the check and insert share one transaction.
    pub fn create_account(
        &self,
        id: Uuid,
        username: &str,
        password_hash: &str,
        token: &str,
    ) -> Result<Option<AccountRow>> {
        self.transaction(|tx| {
            if query_account_by_username(tx, username)?.is_some() {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO users (id, username, password, new_token) VALUES (?1, ?2, ?3, ?4)",
                (id.to_string(), username, password_hash, token),
            )?;

            query_account_by_id(tx, &id.to_string())
        })
    }

    pub fn get_account_by_username(&self, username: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account_by_username(conn, username))
    }

    pub fn get_account_by_id(&self, id: Uuid) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account_by_id(conn, &id.to_string()))
    }

    pub fn list_accounts(&self) -> Result<Vec<AccountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt
                .query_map([], account_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Prefix search on username. `%` and `_` in `term` match literally.
    pub fn search_accounts(&self, term: &str, limit: u32) -> Result<Vec<AccountRow>> {
        let pattern = format!("{}%", escape_like(term));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM users
                 WHERE username LIKE ?1 ESCAPE '\\'
                 ORDER BY username ASC
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![pattern, limit], account_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Session tokens --

    /// The live token for `id`, or `None` if no such account exists.
    pub fn get_token(&self, id: Uuid) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let token = conn
                .query_row(
                    "SELECT new_token FROM users WHERE id = ?1",
                    [id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(token)
        })
    }

    /// Replace the live token. Returns false if the account does not exist.
    pub fn set_token(&self, id: Uuid, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET new_token = ?1 WHERE id = ?2",
                (token, id.to_string()),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Profile --

    pub fn set_phone_number(&self, id: Uuid, phone_number: &str) -> Result<Option<AccountRow>> {
        self.update_account(id, "UPDATE users SET phone_number = ?1 WHERE id = ?2", phone_number)
    }

    pub fn set_device_token(&self, id: Uuid, device_token: &str) -> Result<Option<AccountRow>> {
        self.update_account(id, "UPDATE users SET device_token = ?1 WHERE id = ?2", device_token)
    }

    fn update_account(&self, id: Uuid, sql: &str, value: &str) -> Result<Option<AccountRow>> {
        self.transaction(|tx| {
            let id = id.to_string();
            if tx.execute(sql, (value, &id))? == 0 {
                return Ok(None);
            }
            query_account_by_id(tx, &id)
        })
    }
}

pub(crate) fn account_from_row(row: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        device_token: row.get(3)?,
        phone_number: row.get(4)?,
        token: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_account_by_username(conn: &Connection, username: &str) -> Result<Option<AccountRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            account_from_row,
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn query_account_by_id(conn: &Connection, id: &str) -> Result<Option<AccountRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            account_from_row,
        )
        .optional()?;
    Ok(row)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

use std::collections::BTreeSet;

use anyhow::Result;
use rusqlite::types::ToSql;
use uuid::Uuid;

use crate::Database;
use crate::models::SuggestionRow;

impl Database {
    /// Accounts whose stored phone number is one of `numbers`, excluding
    /// `requester`, each flagged with the follow relation to the requester.
    ///
    /// One statement: `phone_number IN (?2, ?3, ...)` with every number bound
    /// as a parameter and the self-exclusion in the same WHERE clause. An
    /// empty set still runs the query (`IN ()` is valid SQLite) and yields
    /// no rows.
    pub fn find_accounts_by_phone(
        &self,
        requester: Uuid,
        numbers: &BTreeSet<String>,
    ) -> Result<Vec<SuggestionRow>> {
        let placeholders: Vec<String> = (2..numbers.len() + 2).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT u.id, u.username,
                    EXISTS(SELECT 1 FROM user_followers f
                           WHERE f.user_id = u.id AND f.follower_id = ?1),
                    EXISTS(SELECT 1 FROM user_followers f
                           WHERE f.user_id = ?1 AND f.follower_id = u.id)
             FROM users u
             WHERE u.id != ?1 AND u.phone_number IN ({})
             ORDER BY u.username ASC",
            placeholders.join(", ")
        );

        let requester = requester.to_string();
        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(numbers.len() + 1);
        params.push(&requester);
        params.extend(numbers.iter().map(|n| n as &dyn ToSql));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(SuggestionRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        following: row.get(2)?,
                        follows_you: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

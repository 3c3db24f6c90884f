pub mod contacts;
pub mod graph;
pub mod migrations;
pub mod models;
pub mod queries;

pub use graph::GraphError;

use anyhow::Result;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Handle to the SQLite store. Opened once by the composition root and shared
/// behind an `Arc`; every request borrows the connection for the duration of
/// one closure.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::prepare(conn)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Borrow the connection for one closure. A panic in an earlier closure
    /// does not lock everyone else out: any transaction it held has already
    /// rolled back when its guard unwound.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&conn)
    }

    /// Run `f` inside a transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
        E: From<anyhow::Error> + From<rusqlite::Error>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tests::seed;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn panic_while_holding_connection_rolls_back_and_releases_it() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, "alice");

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            db.transaction(|tx| -> Result<()> {
                tx.execute("DELETE FROM users", [])?;
                panic!("fault mid-transaction");
            })
        }));
        assert!(outcome.is_err());

        let names: Vec<String> = db
            .list_accounts()
            .unwrap()
            .into_iter()
            .map(|row| row.username)
            .collect();
        assert_eq!(names, ["alice"]);
    }
}

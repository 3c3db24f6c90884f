use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password        TEXT NOT NULL,
                device_token    TEXT,
                phone_number    TEXT,
                new_token       TEXT NOT NULL UNIQUE,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_users_phone ON users(phone_number);

            -- user_id is followed by follower_id
            CREATE TABLE user_followers (
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                follower_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_user_followers_user ON user_followers(user_id, follower_id);
            CREATE INDEX idx_user_followers_follower ON user_followers(follower_id);

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                from_user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                message         TEXT NOT NULL,
                type            TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE message_to_users (
                message_id      TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                read            INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (message_id, user_id)
            );

            CREATE INDEX idx_message_to_users_user ON message_to_users(user_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

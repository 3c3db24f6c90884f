/// Database row types, mapped directly from SQLite rows.
/// Each one projects to its public wire type through `PublicView`; raw rows
/// are never serialized.
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use populr_types::PublicView;
use populr_types::models::{Message, Suggestion, User};

#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string.
    pub password: String,
    pub device_token: Option<String>,
    pub phone_number: Option<String>,
    /// The live rotating session token.
    pub token: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub sender_username: String,
    pub body: String,
    pub kind: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct SuggestionRow {
    pub id: String,
    pub username: String,
    pub following: bool,
    pub follows_you: bool,
}

impl PublicView for AccountRow {
    type View = User;

    fn public_view(self) -> User {
        User {
            id: parse_id(&self.id, "account"),
            username: self.username,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl PublicView for MessageRow {
    type View = Message;

    fn public_view(self) -> Message {
        Message {
            id: parse_id(&self.id, "message"),
            sender_id: parse_id(&self.sender_id, "sender"),
            sender_username: self.sender_username,
            body: self.body,
            kind: self.kind,
            read: self.read,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl PublicView for SuggestionRow {
    type View = Suggestion;

    fn public_view(self) -> Suggestion {
        Suggestion {
            id: parse_id(&self.id, "suggestion"),
            username: self.username,
            following: self.following,
            follows_you: self.follows_you,
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountRow {
        AccountRow {
            id: Uuid::new_v4().to_string(),
            username: "alice".into(),
            password: "$argon2id$v=19$secret".into(),
            device_token: Some("apns-device".into()),
            phone_number: Some("5551234".into()),
            token: "live-session-token".into(),
            created_at: "2024-03-01 12:30:00".into(),
        }
    }

    #[test]
    fn account_projection_hides_credentials() {
        let row = account();
        let json = serde_json::to_string(&row.public_view()).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("live-session-token"));
        assert!(!json.contains("apns-device"));
        assert!(!json.contains("5551234"));
    }

    #[test]
    fn sqlite_timestamps_parse_as_utc() {
        let ts = parse_timestamp("2024-03-01 12:30:00");
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }
}

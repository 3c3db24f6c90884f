use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::view::PublicView;

/// Public projection of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Returned by signup and login: the account plus its live session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// A "people you may know" entry produced by contact matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub username: String,
    /// The caller already follows this account.
    pub following: bool,
    /// This account follows the caller.
    pub follows_you: bool,
}

/// A message as seen by one of its recipients (or by the sender on creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgement for operations with nothing else to report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

macro_rules! already_public {
    ($($ty:ty),*) => {
        $(
            impl PublicView for $ty {
                type View = $ty;

                fn public_view(self) -> $ty {
                    self
                }
            }
        )*
    };
}

already_public!(User, Session, Suggestion, Message, Ack);

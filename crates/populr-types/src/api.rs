use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Envelope --

/// Success document: `{"data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Resource<T> {
    pub data: T,
}

/// Failure document: `{"errors": [...]}`. Always carries exactly one entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub id: String,
    pub status: u16,
    pub title: String,
    pub detail: String,
    /// User-facing text, deliberately less detailed than `detail`.
    pub message: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Profile --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneNumberRequest {
    pub phone_number: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub recipients: Vec<Uuid>,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// -- Contacts --

/// One address-book entry. Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phones: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactsRequest {
    pub data: Vec<Contact>,
}

//! The fixed catalog of errors the API can return.
//!
//! Every failure resolves to exactly one [`ApiError`] variant. Each variant is
//! bound to one status code and one set of texts; handlers pick a variant and
//! never build error bodies themselves.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use populr_db::GraphError;
use populr_types::api::{ErrorDocument, ErrorObject};

use crate::envelope::vnd_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiError {
    BadRequest,
    NotAcceptable,
    UnsupportedMediaType,
    InternalServerError,
    UserAlreadyExists,
    PasswordTooShort,
    UsernameInvalid,
    NotFriends,
    CannotFriendSelf,
    AlreadyFriends,
    Friending,
    NoXKey,
    NoToken,
    BadToken,
    InvalidLogin,
    NoUserForId,
}

/// One row of the catalog.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: &'static str,
    pub message: &'static str,
}

impl ApiError {
    pub const ALL: [ApiError; 16] = [
        Self::BadRequest,
        Self::NotAcceptable,
        Self::UnsupportedMediaType,
        Self::InternalServerError,
        Self::UserAlreadyExists,
        Self::PasswordTooShort,
        Self::UsernameInvalid,
        Self::NotFriends,
        Self::CannotFriendSelf,
        Self::AlreadyFriends,
        Self::Friending,
        Self::NoXKey,
        Self::NoToken,
        Self::BadToken,
        Self::InvalidLogin,
        Self::NoUserForId,
    ];

    pub fn entry(self) -> CatalogEntry {
        let (id, status, title, detail, message) = match self {
            Self::BadRequest => (
                "bad_request",
                StatusCode::BAD_REQUEST,
                "Bad request",
                "Request body is not well-formed. It must be JSON.",
                "Something about that request was wrong.",
            ),
            Self::NotAcceptable => (
                "not_acceptable",
                StatusCode::NOT_ACCEPTABLE,
                "Not Acceptable",
                "Accept header must be set to 'application/vnd.api+json'.",
                "Please update the app.",
            ),
            Self::UnsupportedMediaType => (
                "unsupported_media_type",
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Media Type",
                "Content-Type header must be set to: 'application/vnd.api+json'.",
                "Please update the app.",
            ),
            Self::InternalServerError => (
                "internal_server_error",
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Something went wrong.",
                "Something went wrong.",
            ),
            Self::UserAlreadyExists => (
                "user_already_exists",
                StatusCode::CONFLICT,
                "User Already Exists",
                "New users must have unique username.",
                "Username taken. Sorry",
            ),
            Self::PasswordTooShort => (
                "password_too_short",
                StatusCode::CONFLICT,
                "Password too short",
                "The password you entered is too short.",
                "Password too short.",
            ),
            Self::UsernameInvalid => (
                "username_invalid",
                StatusCode::CONFLICT,
                "Invalid Username",
                "The username you entered is invalid.",
                "Must be 3-16 characters. a-z, 0-9.",
            ),
            Self::NotFriends => (
                "not_friends",
                StatusCode::CONFLICT,
                "Not Friends with User",
                "Tried to unfriend a user who you are not friends with.",
                "You are not friends with that user.",
            ),
            Self::CannotFriendSelf => (
                "cannot_friend_self",
                StatusCode::CONFLICT,
                "Can't friend yourself",
                "You tried to friend yourself. Don't do that.",
                "You can't friend yourself.",
            ),
            Self::AlreadyFriends => (
                "already_friends",
                StatusCode::CONFLICT,
                "Can't befriend someone twice",
                "You tried to friend someone twice. Don't do that.",
                "You are already friends.",
            ),
            Self::Friending => (
                "friending_error",
                StatusCode::CONFLICT,
                "Friending Error",
                "Either you or the person you are trying to friend do not exist.",
                "Could not add that friend.",
            ),
            Self::NoXKey => (
                "no_x_key",
                StatusCode::CONFLICT,
                "No x-key value in header",
                "HTTP x-key needs to be set for this request.",
                "Please log in again.",
            ),
            Self::NoToken => (
                "no_token",
                StatusCode::CONFLICT,
                "No token value in header",
                "Token needs to be set for this request.",
                "Please log in again.",
            ),
            Self::BadToken => (
                "bad_token",
                StatusCode::CONFLICT,
                "Bad token value in header",
                "Bad token in this request.",
                "Please log in again.",
            ),
            Self::InvalidLogin => (
                "invalid_login",
                StatusCode::CONFLICT,
                "Invalid Login",
                "The username or password is incorrect.",
                "The username or password is incorrect.",
            ),
            Self::NoUserForId => (
                "no_user_for_id",
                StatusCode::CONFLICT,
                "Could not find user",
                "No user found for that Id.",
                "That user doesn't exist.",
            ),
        };

        CatalogEntry {
            id,
            status,
            title,
            detail,
            message,
        }
    }

    pub fn id(self) -> &'static str {
        self.entry().id
    }

    pub fn status(self) -> StatusCode {
        self.entry().status
    }

    pub fn document(self) -> ErrorDocument {
        let entry = self.entry();
        ErrorDocument {
            errors: vec![ErrorObject {
                id: entry.id.to_string(),
                status: entry.status.as_u16(),
                title: entry.title.to_string(),
                detail: entry.detail.to_string(),
                message: entry.message.to_string(),
            }],
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry();
        write!(f, "{} ({})", entry.id, entry.title)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        vnd_json(self.status(), &self.document())
    }
}

/// Storage failures. The detail goes to the log, never to the client.
impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("Storage error: {:#}", e);
        Self::InternalServerError
    }
}

impl From<GraphError> for ApiError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::SelfFollow => Self::CannotFriendSelf,
            GraphError::AlreadyFollowing => Self::AlreadyFriends,
            GraphError::NotFollowing => Self::NotFriends,
            GraphError::UnknownAccount(_) => Self::NoUserForId,
            GraphError::UnknownMessage(_) | GraphError::NoRecipients => Self::BadRequest,
            GraphError::Sqlite(e) => {
                error!("Graph storage error: {}", e);
                Self::InternalServerError
            }
            GraphError::Storage(e) => Self::from(e),
        }
    }
}

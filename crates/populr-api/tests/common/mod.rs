#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use populr_api::auth::issue_token;
use populr_api::middleware::{NEW_TOKEN, X_KEY};
use populr_api::{AppState, AppStateInner};
use populr_db::Database;
use populr_types::VND_JSON;

pub struct TestApp {
    pub state: AppState,
    pub app: Router,
}

/// An account created straight through the store, with its live token.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub token: String,
}

pub struct Reply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

impl Reply {
    pub fn error_id(&self) -> &str {
        self.body["errors"][0]["id"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppStateInner::new(Database::open_in_memory().unwrap());
        let app = populr_api::router(state.clone());
        Self { state, app }
    }

    pub fn seed(&self, username: &str) -> Account {
        let id = Uuid::new_v4();
        let token = issue_token();
        self.state
            .db
            .create_account(id, username, "not-a-real-hash", &token)
            .unwrap()
            .unwrap();
        Account { id, token }
    }

    pub fn seed_with_phone(&self, username: &str, phone: &str) -> Account {
        let account = self.seed(username);
        self.state.db.set_phone_number(account.id, phone).unwrap();
        account
    }

    pub async fn send(&self, req: Request<Body>) -> Reply {
        send_to(&self.app, req).await
    }
}

pub async fn send_to(app: &Router, req: Request<Body>) -> Reply {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        content_type,
        body,
    }
}

/// A request carrying both vendor media type headers.
pub fn vnd(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, VND_JSON)
        .header(header::CONTENT_TYPE, VND_JSON)
}

/// A request from `account`, with its live token.
pub fn authed(method: Method, uri: &str, account: &Account) -> axum::http::request::Builder {
    vnd(method, uri)
        .header(X_KEY, account.id.to_string())
        .header(NEW_TOKEN, &account.token)
}

pub fn json(value: Value) -> Body {
    Body::from(value.to_string())
}

pub fn empty() -> Body {
    Body::empty()
}

pub fn assert_error(reply: &Reply, status: StatusCode, id: &str) {
    assert_eq!(reply.status, status, "body: {}", reply.body);
    assert_eq!(reply.error_id(), id, "body: {}", reply.body);
    assert_eq!(reply.content_type.as_deref(), Some(VND_JSON));
}

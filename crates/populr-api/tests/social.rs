mod common;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use common::*;

async fn signup(app: &TestApp, username: &str, password: &str) -> Reply {
    let req = vnd(Method::POST, "/signup")
        .body(json(json!({"username": username, "password": password})))
        .unwrap();
    app.send(req).await
}

async fn login(app: &TestApp, username: &str, password: &str) -> Reply {
    let req = vnd(Method::POST, "/login")
        .body(json(json!({"username": username, "password": password})))
        .unwrap();
    app.send(req).await
}

fn account_from_session(reply: &Reply) -> Account {
    Account {
        id: reply.data()["user"]["id"].as_str().unwrap().parse().unwrap(),
        token: reply.data()["token"].as_str().unwrap().to_string(),
    }
}

fn usernames(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect()
}

// -- Accounts --

#[tokio::test]
async fn signup_round_trip_and_duplicate() {
    let app = TestApp::new();

    let reply = signup(&app, "alice", "password1").await;
    assert_eq!(reply.status, StatusCode::CREATED, "body: {}", reply.body);
    assert_eq!(reply.data()["user"]["username"], "alice");
    assert!(reply.data()["token"].is_string());
    let raw = reply.body.to_string();
    assert!(!raw.contains("argon2"));
    assert!(!raw.contains("password1"));

    let reply = signup(&app, "alice", "password2").await;
    assert_error(&reply, StatusCode::CONFLICT, "user_already_exists");

    let req = vnd(Method::GET, "/users").body(empty()).unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(usernames(reply.data()), vec!["alice"]);
}

#[tokio::test]
async fn signup_validation() {
    let app = TestApp::new();

    assert_error(
        &signup(&app, "alice", "short").await,
        StatusCode::CONFLICT,
        "password_too_short",
    );
    assert_error(
        &signup(&app, "Not Valid!", "password1").await,
        StatusCode::CONFLICT,
        "username_invalid",
    );
    assert!(app.state.db.list_accounts().unwrap().is_empty());
}

#[tokio::test]
async fn login_rotates_the_token() {
    let app = TestApp::new();
    let first = account_from_session(&signup(&app, "alice", "password1").await);

    let reply = login(&app, "alice", "password1").await;
    assert_eq!(reply.status, StatusCode::OK, "body: {}", reply.body);
    let second = account_from_session(&reply);
    assert_eq!(first.id, second.id);
    assert_ne!(first.token, second.token);

    let req = authed(Method::GET, "/following", &first).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "bad_token");

    let req = authed(Method::GET, "/following", &second).body(empty()).unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::new();
    signup(&app, "alice", "password1").await;

    assert_error(
        &login(&app, "alice", "wrong-password").await,
        StatusCode::CONFLICT,
        "invalid_login",
    );
    assert_error(
        &login(&app, "nobody", "password1").await,
        StatusCode::CONFLICT,
        "invalid_login",
    );
}

#[tokio::test]
async fn logout_kills_the_token() {
    let app = TestApp::new();
    let alice = app.seed("alice");

    let req = authed(Method::POST, "/logout", &alice).body(empty()).unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.data().get("token").is_none());

    let req = authed(Method::GET, "/following", &alice).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "bad_token");
}

#[tokio::test]
async fn user_lookup_and_search() {
    let app = TestApp::new();
    let alice = app.seed("alice");
    app.seed("alina");
    app.seed("bob");

    let uri = format!("/users/{}", Uuid::new_v4());
    let req = authed(Method::GET, &uri, &alice).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "no_user_for_id");

    let uri = format!("/users/{}", alice.id);
    let req = authed(Method::GET, &uri, &alice).body(empty()).unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.data()["username"], "alice");

    let req = authed(Method::GET, "/searchusers/ali", &alice).body(empty()).unwrap();
    let reply = app.send(req).await;
    assert_eq!(usernames(reply.data()), vec!["alice", "alina"]);
}

// -- Follow graph --

#[tokio::test]
async fn following_twice_is_already_friends() {
    let app = TestApp::new();
    let alice = app.seed("alice");
    let bob = app.seed("bob");
    let uri = format!("/friend/{}", bob.id);

    let req = authed(Method::POST, &uri, &alice).body(empty()).unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::CREATED, "body: {}", reply.body);
    assert_eq!(reply.data()["username"], "bob");

    let req = authed(Method::POST, &uri, &alice).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "already_friends");

    assert_eq!(app.state.db.count_follow_edges(bob.id, alice.id).unwrap(), 1);

    let req = authed(Method::GET, "/followers", &bob).body(empty()).unwrap();
    assert_eq!(usernames(app.send(req).await.data()), vec!["alice"]);

    let req = authed(Method::GET, "/following", &alice).body(empty()).unwrap();
    assert_eq!(usernames(app.send(req).await.data()), vec!["bob"]);
}

#[tokio::test]
async fn following_self_is_rejected() {
    let app = TestApp::new();
    let alice = app.seed("alice");

    let uri = format!("/friend/{}", alice.id);
    let req = authed(Method::POST, &uri, &alice).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "cannot_friend_self");

    assert_eq!(app.state.db.count_follow_edges(alice.id, alice.id).unwrap(), 0);
}

#[tokio::test]
async fn following_unknown_account_is_friending_error() {
    let app = TestApp::new();
    let alice = app.seed("alice");

    let uri = format!("/friend/{}", Uuid::new_v4());
    let req = authed(Method::POST, &uri, &alice).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "friending_error");
}

#[tokio::test]
async fn unfriending_without_edge_is_not_friends() {
    let app = TestApp::new();
    let alice = app.seed("alice");
    let bob = app.seed("bob");
    let unfriend = format!("/unfriend/{}", bob.id);

    let req = authed(Method::DELETE, &unfriend, &alice).body(empty()).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "not_friends");

    let req = authed(Method::POST, &format!("/friend/{}", bob.id), &alice)
        .body(empty())
        .unwrap();
    app.send(req).await;

    let req = authed(Method::DELETE, &unfriend, &alice).body(empty()).unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(app.state.db.count_follow_edges(bob.id, alice.id).unwrap(), 0);
}

// -- Contacts --

#[tokio::test]
async fn contacts_never_suggest_the_requester() {
    let app = TestApp::new();
    let alice = app.seed_with_phone("alice", "5550001");
    app.seed_with_phone("bob", "5550002");
    app.seed_with_phone("carol", "5550003");

    let body = json!({"data": [
        {"first_name": "Me", "last_name": "Myself", "phones": ["555-0001"]},
        {"first_name": "Bob", "last_name": "B", "phones": ["", "(555) 0002"]},
        {"first_name": "Nobody", "last_name": "N", "phones": ["5559999"]}
    ]});
    let req = authed(Method::POST, "/contacts", &alice).body(json(body)).unwrap();
    let reply = app.send(req).await;

    assert_eq!(reply.status, StatusCode::OK, "body: {}", reply.body);
    assert_eq!(usernames(reply.data()), vec!["bob"]);
    assert_eq!(reply.data()[0]["following"], false);
    assert_eq!(reply.data()[0]["follows_you"], false);
}

#[tokio::test]
async fn empty_contact_list_matches_nothing() {
    let app = TestApp::new();
    let alice = app.seed_with_phone("alice", "5550001");
    app.seed_with_phone("bob", "5550002");

    let req = authed(Method::POST, "/contacts", &alice)
        .body(json(json!({"data": []})))
        .unwrap();
    let reply = app.send(req).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data(), &json!([]));
}

#[tokio::test]
async fn phone_registration_feeds_matching() {
    let app = TestApp::new();
    let alice = app.seed("alice");
    let bob = app.seed("bob");

    let req = authed(Method::POST, "/phone", &bob)
        .body(json(json!({"phone_number": "+1 555 123 4567"})))
        .unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.data().get("phone_number").is_none());

    let req = authed(Method::POST, "/contacts", &alice)
        .body(json(json!({"data": [{"first_name": "Bob", "last_name": "", "phones": ["+1-555-123-4567"]}]})))
        .unwrap();
    let reply = app.send(req).await;
    assert_eq!(usernames(reply.data()), vec!["bob"]);
}

// -- Messages --

#[tokio::test]
async fn message_read_state_is_per_recipient() {
    let app = TestApp::new();
    let alice = app.seed("alice");
    let bob = app.seed("bob");
    let carol = app.seed("carol");

    let body = json!({"recipients": [bob.id, carol.id], "body": "hello", "type": "text"});
    let req = authed(Method::POST, "/message", &alice).body(json(body)).unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::CREATED, "body: {}", reply.body);
    assert_eq!(reply.data()["type"], "text");
    let message_id = reply.data()["id"].as_str().unwrap().to_string();

    let req = authed(Method::POST, &format!("/readmessage/{message_id}"), &bob)
        .body(empty())
        .unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::OK);

    let req = authed(Method::GET, "/messages", &bob).body(empty()).unwrap();
    let inbox = app.send(req).await;
    assert_eq!(inbox.data()[0]["read"], true);
    assert_eq!(inbox.data()[0]["sender_username"], "alice");

    let req = authed(Method::GET, "/messages", &carol).body(empty()).unwrap();
    let inbox = app.send(req).await;
    assert_eq!(inbox.data()[0]["read"], false);

    // Alice is not a recipient of her own message.
    let req = authed(Method::POST, &format!("/readmessage/{message_id}"), &alice)
        .body(empty())
        .unwrap();
    assert_error(&app.send(req).await, StatusCode::BAD_REQUEST, "bad_request");
}

#[tokio::test]
async fn message_recipient_errors() {
    let app = TestApp::new();
    let alice = app.seed("alice");

    let body = json!({"recipients": [], "body": "hello", "type": "text"});
    let req = authed(Method::POST, "/message", &alice).body(json(body)).unwrap();
    assert_error(&app.send(req).await, StatusCode::BAD_REQUEST, "bad_request");

    let body = json!({"recipients": [Uuid::new_v4()], "body": "hello", "type": "text"});
    let req = authed(Method::POST, "/message", &alice).body(json(body)).unwrap();
    assert_error(&app.send(req).await, StatusCode::CONFLICT, "no_user_for_id");
}

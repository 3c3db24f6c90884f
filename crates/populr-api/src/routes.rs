use axum::{
    Router,
    http::{Method, Uri},
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::ApiError;
use crate::middleware;
use crate::state::AppState;
use crate::{auth, contacts, friends, messages, users};

/// The full route table with each group behind its chain.
pub fn router(state: AppState) -> Router {
    let open = middleware::open(Router::new().route("/users", get(users::list_users)));

    let open_with_body = middleware::open_with_body(
        Router::new()
            .route("/signup", post(auth::signup))
            .route("/login", post(auth::login)),
    );

    let guarded = middleware::guarded(
        Router::new()
            .route("/users/{id}", get(users::get_user))
            .route("/searchusers/{term}", get(users::search_users))
            .route("/phone", post(users::set_phone_number))
            .route("/token/{token}", post(users::set_device_token))
            .route("/logout", post(auth::logout))
            .route("/followers", get(friends::followers))
            .route("/following", get(friends::following))
            .route("/friend/{id}", post(friends::follow))
            .route("/unfriend/{id}", delete(friends::unfollow))
            .route("/message", post(messages::send_message))
            .route("/messages", get(messages::list_messages))
            .route("/readmessage/{id}", post(messages::read_message))
            .route("/contacts", post(contacts::match_contacts)),
        state.clone(),
    );

    let app = Router::new()
        .merge(open)
        .merge(open_with_body)
        .merge(guarded)
        .fallback(unmatched)
        .method_not_allowed_fallback(unmatched)
        .layer(CorsLayer::permissive());

    middleware::outer(app).with_state(state)
}

/// Unknown paths and methods still answer with a catalog error document.
async fn unmatched(method: Method, uri: Uri) -> ApiError {
    warn!("No route for {} {}", method, uri.path());
    ApiError::BadRequest
}

pub mod auth;
pub mod contacts;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod friends;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};

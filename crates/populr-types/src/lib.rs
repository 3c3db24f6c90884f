pub mod api;
pub mod models;
pub mod view;

pub use view::PublicView;

/// The only media type the API speaks, in both directions.
pub const VND_JSON: &str = "application/vnd.api+json";

//! HTTP API: upload, ask, list and delete documents

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use server::build_app;
pub use server::connect_state;
pub use server::serve_api;

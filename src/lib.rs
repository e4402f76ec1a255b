pub mod annotation;
pub mod app_state;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod store;

pub use app_state::AppState;
pub use routes::create_routes;

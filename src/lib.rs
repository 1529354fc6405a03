pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod state;

pub use config::AppConfig;
pub use routes::build_router;
pub use state::AppState;

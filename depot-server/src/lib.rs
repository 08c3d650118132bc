#![forbid(unsafe_code)]

pub mod config;
pub mod index;
pub mod routes;

pub use config::ServerConfig;
pub use routes::router;

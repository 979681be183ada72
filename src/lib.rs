//! Function host key authorization library.

pub mod admin;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod secrets;

pub use auth::{AuthorizationLevel, LevelResolver, RouteRequirement};
pub use config::HostConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use secrets::{SecretStore, SecretStoreError};

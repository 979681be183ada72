//! Request middleware.

pub mod authorization;

pub use authorization::{authorization_middleware, RouteAuthState};

//! HTTP API layer for bookmarket.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: marketplace, wallet, moderation, and admin routes
//! - **Extractors**: authentication and role checks
//! - **Middleware**: bearer-token session resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

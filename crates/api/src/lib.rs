//! HTTP API layer for pawpost.
//!
//! - **Endpoints**: auth, posts (feed, moderation, likes, comments), users,
//!   tags and admin routes
//! - **Extractors**: the request-scoped caller
//! - **Middleware**: bearer-token resolution and the shared [`AppState`]
//!
//! Built on Axum 0.8; the server crate adds the Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

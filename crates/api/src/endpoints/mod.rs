//! API endpoints.

mod admin;
mod auth;
mod posts;
mod tags;
mod users;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Pagination query shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/posts", posts::router())
        .nest("/comments", posts::comments_router())
        .nest("/users", users::router())
        .nest("/tags", tags::router())
        .nest("/admin", admin::router())
}

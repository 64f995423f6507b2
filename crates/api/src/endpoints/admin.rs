//! Admin endpoints. Every route requires the moderate capability.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, put},
};
use pawpost_common::AppResult;
use pawpost_core::{Capability, Role, SiteStats};
use serde::Deserialize;

use super::Page;
use crate::{
    extractors::AuthActor,
    middleware::AppState,
    response::{
        AdminUserResponse, CommentResponse, LogEntryResponse, PostResponse, UserResponse,
        no_content,
    },
};

/// Role change request.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// Account status request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub is_active: bool,
}

async fn stats(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
) -> AppResult<Json<SiteStats>> {
    Ok(Json(state.admin_service.stats(&actor).await?))
}

async fn users(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<AdminUserResponse>>> {
    let limit = state.feed.clamp(page.limit);
    let users = state
        .user_service
        .list_users(&actor, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(users.into_iter().map(AdminUserResponse::from).collect()))
}

async fn change_role(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.change_role(&actor, &id, req.role).await?;
    Ok(Json(user.into()))
}

async fn change_status(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .set_status(&actor, &id, req.is_active)
        .await?;
    Ok(Json(user.into()))
}

/// Every post in every status.
async fn posts(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .moderation_service
        .list_by_status(&actor, None, page.limit, page.offset.unwrap_or(0))
        .await?;
    let details = state.post_service.hydrate(Some(&actor), posts).await?;
    Ok(Json(details.into_iter().map(PostResponse::from).collect()))
}

async fn delete_post(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    actor.require(Capability::Moderate)?;
    state.post_service.delete(&actor, &id).await?;
    Ok(no_content())
}

async fn comments(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let limit = state.feed.clamp(page.limit);
    let comments = state
        .engagement_service
        .list_all_comments(&actor, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

async fn delete_comment(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    actor.require(Capability::Moderate)?;
    state.engagement_service.delete_comment(&actor, &id).await?;
    Ok(no_content())
}

async fn logs(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<LogEntryResponse>>> {
    let limit = state.feed.clamp(page.limit);
    let entries = state.admin_service.logs(&actor, limit).await?;
    Ok(Json(entries.into_iter().map(LogEntryResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(users))
        .route("/users/{id}/role", put(change_role))
        .route("/users/{id}/status", put(change_status))
        .route("/posts", get(posts))
        .route("/posts/{id}", delete(delete_post))
        .route("/comments", get(comments))
        .route("/comments/{id}", delete(delete_comment))
        .route("/logs", get(logs))
}

//! User profile and follow endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use pawpost_common::AppResult;
use pawpost_core::{FollowEntry, ListOptions, PostQuery};

use super::Page;
use crate::{
    extractors::MaybeActor,
    middleware::AppState,
    response::{FollowResponse, PostResponse, ProfileResponse},
};

async fn show(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.user_service.profile(actor.actor(), &id).await?;
    Ok(Json(profile.into()))
}

/// A user's approved posts.
async fn posts(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .list(
            actor.actor(),
            &PostQuery::Profile { user_id: id },
            ListOptions {
                limit: page.limit,
                offset: page.offset.unwrap_or(0),
                ..ListOptions::default()
            },
        )
        .await?;
    let details = state.post_service.hydrate(actor.actor(), posts).await?;
    Ok(Json(details.into_iter().map(PostResponse::from).collect()))
}

async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<FollowEntry>>> {
    let limit = state.feed.clamp(page.limit);
    let entries = state
        .engagement_service
        .followers(&id, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(entries))
}

async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<FollowEntry>>> {
    let limit = state.feed.clamp(page.limit);
    let entries = state
        .engagement_service
        .following(&id, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(entries))
}

/// Follow or unfollow a user.
async fn follow(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FollowResponse>> {
    let result = state
        .engagement_service
        .toggle_follow(actor.actor(), &id)
        .await?;
    Ok(Json(FollowResponse {
        following: result.following,
        count: result.followers_count,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/posts", get(posts))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
        .route("/{id}/follow", post(follow))
}

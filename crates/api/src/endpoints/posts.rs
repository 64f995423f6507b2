//! Post endpoints: feed, editing, moderation and engagement.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete as delete_route, get, post as post_route, put},
};
use pawpost_common::AppResult;
use pawpost_core::{Actor, CreatePostInput, ListOptions, PostQuery, UpdatePostInput};
use pawpost_db::{
    entities::post::{self, Category, PostStatus},
    repositories::PostOrder,
};
use serde::Deserialize;

use super::Page;
use crate::{
    extractors::{AuthActor, MaybeActor},
    middleware::AppState,
    response::{
        CommentResponse, Created, LikeCountResponse, LikeResponse, PostResponse, no_content,
    },
};

/// Feed query.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub category: Option<Category>,
    pub tag: Option<String>,
    /// Free-text search, same as `/posts/search`.
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Moderation tab query.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<PostStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Reject request.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

/// Feature request.
#[derive(Debug, Deserialize)]
pub struct FeatureRequest {
    pub is_featured: bool,
}

/// Comment request.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

async fn render(
    state: &AppState,
    actor: &MaybeActor,
    posts: Vec<post::Model>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let details = state.post_service.hydrate(actor.actor(), posts).await?;
    Ok(Json(details.into_iter().map(PostResponse::from).collect()))
}

async fn render_one(
    state: &AppState,
    actor: Option<&Actor>,
    post: post::Model,
) -> AppResult<PostResponse> {
    Ok(state.post_service.hydrate_one(actor, post).await?.into())
}

/// Public feed of approved posts.
async fn feed(
    actor: MaybeActor,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let search = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let posts = state
        .post_service
        .list(
            actor.actor(),
            &PostQuery::PublicFeed,
            ListOptions {
                category: query.category,
                tag: query.tag,
                search,
                limit: query.limit,
                offset: query.offset.unwrap_or(0),
                ..ListOptions::default()
            },
        )
        .await?;
    render(&state, &actor, posts).await
}

/// Create a post. It starts out pending.
async fn create(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<Created<PostResponse>> {
    let post = state.post_service.create(&actor, input).await?;
    Ok(Created(render_one(&state, Some(&actor), post).await?))
}

async fn search(
    actor: MaybeActor,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .search(
            actor.actor(),
            &query.q,
            query.limit,
            query.offset.unwrap_or(0),
        )
        .await?;
    render(&state, &actor, posts).await
}

/// The most recently featured post, or `null`.
async fn featured(
    actor: MaybeActor,
    State(state): State<AppState>,
) -> AppResult<Json<Option<PostResponse>>> {
    let Some(post) = state.post_service.featured(actor.actor()).await? else {
        return Ok(Json(None));
    };
    Ok(Json(Some(render_one(&state, actor.actor(), post).await?)))
}

async fn ordered(
    actor: MaybeActor,
    state: &AppState,
    page: Page,
    order: PostOrder,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .list(
            actor.actor(),
            &PostQuery::PublicFeed,
            ListOptions {
                order,
                limit: page.limit,
                offset: page.offset.unwrap_or(0),
                ..ListOptions::default()
            },
        )
        .await?;
    render(state, &actor, posts).await
}

async fn recent(
    actor: MaybeActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<PostResponse>>> {
    ordered(actor, &state, page, PostOrder::Newest).await
}

async fn most_liked(
    actor: MaybeActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<PostResponse>>> {
    ordered(actor, &state, page, PostOrder::MostLiked).await
}

/// The caller's own posts in every status.
async fn my_posts(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .list(
            Some(&actor),
            &PostQuery::MyPosts,
            ListOptions {
                limit: page.limit,
                offset: page.offset.unwrap_or(0),
                ..ListOptions::default()
            },
        )
        .await?;
    render(&state, &MaybeActor(Some(actor)), posts).await
}

async fn moderation_tab(
    actor: Actor,
    state: &AppState,
    status: Option<PostStatus>,
    limit: Option<u64>,
    offset: Option<u64>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .moderation_service
        .list_by_status(&actor, status, limit, offset.unwrap_or(0))
        .await?;
    render(state, &MaybeActor(Some(actor)), posts).await
}

async fn pending(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<PostResponse>>> {
    moderation_tab(
        actor,
        &state,
        Some(PostStatus::Pending),
        page.limit,
        page.offset,
    )
    .await
}

async fn by_status(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<PostResponse>>> {
    moderation_tab(actor, &state, query.status, query.limit, query.offset).await
}

async fn show(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let post = state.post_service.get_visible(actor.actor(), &id).await?;
    Ok(Json(render_one(&state, actor.actor(), post).await?))
}

async fn update(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<Json<PostResponse>> {
    let post = state.post_service.update(&actor, &id, input).await?;
    Ok(Json(render_one(&state, Some(&actor), post).await?))
}

async fn delete(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(&actor, &id).await?;
    Ok(no_content())
}

async fn approve(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let post = state.moderation_service.approve(&actor, &id).await?;
    Ok(Json(render_one(&state, Some(&actor), post).await?))
}

async fn reject(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> AppResult<Json<PostResponse>> {
    let post = state
        .moderation_service
        .reject(&actor, &id, &req.reason)
        .await?;
    Ok(Json(render_one(&state, Some(&actor), post).await?))
}

async fn set_featured(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FeatureRequest>,
) -> AppResult<Json<PostResponse>> {
    let post = state
        .moderation_service
        .set_featured(&actor, &id, req.is_featured)
        .await?;
    Ok(Json(render_one(&state, Some(&actor), post).await?))
}

async fn toggle_like(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LikeResponse>> {
    let result = state
        .engagement_service
        .toggle_like(actor.actor(), &id)
        .await?;
    Ok(Json(LikeResponse {
        liked: result.liked,
        count: result.count,
    }))
}

async fn likes(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LikeCountResponse>> {
    let count = state.engagement_service.like_count(actor.actor(), &id).await?;
    Ok(Json(LikeCountResponse { count }))
}

async fn comments(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let limit = state.feed.clamp(page.limit);
    let comments = state
        .engagement_service
        .list_comments(actor.actor(), &id, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

async fn add_comment(
    actor: MaybeActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> AppResult<Created<CommentResponse>> {
    let comment = state
        .engagement_service
        .add_comment(actor.actor(), &id, &req.content)
        .await?;
    Ok(Created(comment.into()))
}

/// Delete a comment. Author or admin.
async fn delete_comment(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.engagement_service.delete_comment(&actor, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed).post(create))
        .route("/search", get(search))
        .route("/featured", get(featured))
        .route("/recent", get(recent))
        .route("/most-liked", get(most_liked))
        .route("/my-posts", get(my_posts))
        .route("/pending", get(pending))
        .route("/by-status", get(by_status))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/approve", put(approve))
        .route("/{id}/reject", put(reject))
        .route("/{id}/featured", put(set_featured))
        .route("/{id}/like", post_route(toggle_like))
        .route("/{id}/likes", get(likes))
        .route("/{id}/comments", get(comments).post(add_comment))
}

pub fn comments_router() -> Router<AppState> {
    Router::new().route("/{id}", delete_route(delete_comment))
}

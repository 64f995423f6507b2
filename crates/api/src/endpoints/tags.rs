//! Tag endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use pawpost_common::AppResult;
use serde::Deserialize;

use crate::{middleware::AppState, response::TagResponse};

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<u64>,
}

/// Most used tags among approved posts.
async fn top(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<Vec<TagResponse>>> {
    let limit = state.feed.clamp(query.limit.or(Some(10)));
    let tags = state.tag_service.top(limit).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/top", get(top))
}

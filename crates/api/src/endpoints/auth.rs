//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::{get, post}};
use pawpost_common::AppResult;
use pawpost_core::{LoginInput, RegisterInput};

use crate::{
    extractors::AuthActor,
    middleware::AppState,
    response::{Created, SessionResponse, UserResponse, no_content},
};

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<Created<UserResponse>> {
    let user = state.user_service.register(input).await?;
    Ok(Created(user.into()))
}

/// Sign in and receive a bearer token.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<SessionResponse>> {
    let (token, user) = state.user_service.login(input).await?;

    Ok(Json(SessionResponse {
        token,
        user: user.into(),
    }))
}

/// Sign out (invalidate current token by regenerating).
async fn logout(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.user_service.logout(&actor).await?;
    Ok(no_content())
}

/// Get current user.
async fn me(
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(state.user_service.me(&actor).await?.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

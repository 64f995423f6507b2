//! Application state and request middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use pawpost_common::{Config, config::FeedConfig};
use pawpost_core::{
    AdminService, AuditService, EngagementService, ModerationService, PostService, TagService,
    UserService,
};
use pawpost_db::repositories::{
    CommentRepository, FollowingRepository, ModerationLogRepository, PostLikeRepository,
    PostRepository, TagRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub moderation_service: ModerationService,
    pub engagement_service: EngagementService,
    pub tag_service: TagService,
    pub admin_service: AdminService,
    /// Page size bounds for every list endpoint.
    pub feed: FeedConfig,
}

impl AppState {
    /// Wire every service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let like_repo = PostLikeRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let following_repo = FollowingRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let log_repo = ModerationLogRepository::new(db);

        let audit = AuditService::new(log_repo);
        let tag_service = TagService::new(tag_repo);
        let post_service = PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            like_repo.clone(),
            tag_service.clone(),
            audit.clone(),
            config,
        );
        let moderation_service = ModerationService::new(
            post_repo.clone(),
            post_service.clone(),
            tag_service.clone(),
            audit.clone(),
        );
        let engagement_service = EngagementService::new(
            post_service.clone(),
            like_repo,
            comment_repo.clone(),
            following_repo.clone(),
            user_repo.clone(),
            audit.clone(),
        );
        let user_service = UserService::new(
            user_repo.clone(),
            post_repo.clone(),
            following_repo,
            audit.clone(),
            config,
        );
        let admin_service = AdminService::new(user_repo, post_repo, comment_repo, audit);

        Self {
            user_service,
            post_service,
            moderation_service,
            engagement_service,
            tag_service,
            admin_service,
            feed: config.feed.clone(),
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` into an [`pawpost_core::Actor`]
/// stored in the request extensions. Requests without a valid token pass
/// through anonymously; protected handlers reject them via the extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(header) = req.headers().get(AUTHORIZATION)
        && let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(actor) => {
                req.extensions_mut().insert(actor);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(error = %e, "Token lookup failed");
            }
            Err(_) => {}
        }
    }

    next.run(req).await
}

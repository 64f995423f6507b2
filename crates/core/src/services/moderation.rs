//! Moderation engine: the post review state machine.
//!
//! ```text
//! pending ──approve──▶ approved
//!    │
//!    └────reject────▶ rejected (terminal)
//! ```
//!
//! Transitions are applied with a conditional update on the current status
//! (see `PostRepository::approve`). When the update matches no row the post
//! is re-read to tell a missing post from a lost race or a bad transition.

use chrono::Utc;
use pawpost_common::{AppError, AppResult};
use pawpost_db::{
    entities::post::{self, PostStatus},
    repositories::PostRepository,
};

use super::{
    audit::{AuditService, ModerationAction, TargetType},
    identity::{Actor, Capability},
    post::{ListOptions, PostService},
    tag::TagService,
    visibility::PostQuery,
};

/// Longest accepted rejection reason, in characters.
pub const MAX_REASON_LEN: usize = 1000;

/// Moderation service for business logic.
#[derive(Clone)]
pub struct ModerationService {
    post_repo: PostRepository,
    posts: PostService,
    tags: TagService,
    audit: AuditService,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        posts: PostService,
        tags: TagService,
        audit: AuditService,
    ) -> Self {
        Self {
            post_repo,
            posts,
            tags,
            audit,
        }
    }

    /// Approve a pending post.
    pub async fn approve(&self, actor: &Actor, post_id: &str) -> AppResult<post::Model> {
        actor.require(Capability::Moderate)?;

        if !self.post_repo.approve(post_id, &actor.id, Utc::now()).await? {
            return Err(self.explain_failed_transition(post_id).await);
        }

        let post = self.post_repo.get_by_id(post_id).await?;
        if let Err(e) = self.tags.record_published(&post.tag_names()).await {
            tracing::warn!(error = %e, post_id = post_id, "Failed to update tag counts");
        }

        self.audit
            .record(
                actor,
                ModerationAction::ApprovePost,
                TargetType::Post,
                post_id,
                None,
            )
            .await;

        tracing::info!(post_id = post_id, moderator_id = %actor.id, "Post approved");
        Ok(post)
    }

    /// Reject a pending post with a reason.
    pub async fn reject(
        &self,
        actor: &Actor,
        post_id: &str,
        reason: &str,
    ) -> AppResult<post::Model> {
        actor.require(Capability::Moderate)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "a rejection reason is required".to_string(),
            ));
        }
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(AppError::Validation(format!(
                "rejection reason is longer than {MAX_REASON_LEN} characters"
            )));
        }

        if !self
            .post_repo
            .reject(post_id, &actor.id, reason, Utc::now())
            .await?
        {
            return Err(self.explain_failed_transition(post_id).await);
        }

        self.audit
            .record(
                actor,
                ModerationAction::RejectPost,
                TargetType::Post,
                post_id,
                Some(reason.to_string()),
            )
            .await;

        tracing::info!(post_id = post_id, moderator_id = %actor.id, "Post rejected");
        self.post_repo.get_by_id(post_id).await
    }

    /// Feature or unfeature a post.
    ///
    /// Featuring requires the post to be approved. Unfeaturing is accepted
    /// in any status; clearing a flag that is already clear changes nothing
    /// and writes no audit entry.
    pub async fn set_featured(
        &self,
        actor: &Actor,
        post_id: &str,
        value: bool,
    ) -> AppResult<post::Model> {
        actor.require(Capability::Moderate)?;

        if !self
            .post_repo
            .set_featured(post_id, value, Utc::now())
            .await?
        {
            let post = self.post_repo.get_by_id(post_id).await?;
            if !value {
                return Ok(post);
            }
            return Err(AppError::InvalidState(format!(
                "only approved posts can be featured (post is {})",
                post.status
            )));
        }

        let action = if value {
            ModerationAction::FeaturePost
        } else {
            ModerationAction::UnfeaturePost
        };
        self.audit
            .record(actor, action, TargetType::Post, post_id, None)
            .await;

        tracing::info!(
            post_id = post_id,
            moderator_id = %actor.id,
            is_featured = value,
            "Post featured flag changed"
        );
        self.post_repo.get_by_id(post_id).await
    }

    /// Posts in the moderation queue, optionally for one status tab.
    pub async fn list_by_status(
        &self,
        actor: &Actor,
        status: Option<PostStatus>,
        limit: Option<u64>,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        self.posts
            .list(
                Some(actor),
                &PostQuery::ModerationQueue { status },
                ListOptions {
                    limit,
                    offset,
                    ..ListOptions::default()
                },
            )
            .await
    }

    async fn explain_failed_transition(&self, post_id: &str) -> AppError {
        match self.post_repo.find_by_id(post_id).await {
            Ok(Some(post)) => AppError::InvalidTransition(format!(
                "post is already {}, only pending posts can be reviewed",
                post.status
            )),
            Ok(None) => AppError::PostNotFound(post_id.to_string()),
            Err(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::Role;
    use pawpost_common::Config;
    use pawpost_db::{
        entities::post::Category,
        repositories::{
            ModerationLogRepository, PostLikeRepository, TagRepository, UserRepository,
        },
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ModerationService {
        service_on(Arc::new(db))
    }

    fn service_on(db: Arc<DatabaseConnection>) -> ModerationService {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": {},
            "database": { "url": "postgres://localhost/test" },
        }))
        .unwrap();
        let tags = TagService::new(TagRepository::new(db.clone()));
        let audit = AuditService::new(ModerationLogRepository::new(db.clone()));
        let posts = PostService::new(
            PostRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            PostLikeRepository::new(db.clone()),
            tags.clone(),
            audit.clone(),
            &config,
        );
        ModerationService::new(PostRepository::new(db), posts, tags, audit)
    }

    fn actor(role: Role) -> Actor {
        Actor {
            id: "a1".to_string(),
            name: "Ada".to_string(),
            role,
        }
    }

    fn test_post(status: PostStatus) -> post::Model {
        let reviewed = status != PostStatus::Pending;
        post::Model {
            id: "p1".to_string(),
            user_id: "e1".to_string(),
            title: "Mittens".to_string(),
            content: "Grey cat".to_string(),
            category: Category::Cats,
            image_url: None,
            tags: serde_json::json!([]),
            status,
            is_featured: false,
            featured_at: None,
            reviewed_by: reviewed.then(|| "a1".to_string()),
            reviewed_at: reviewed.then(|| Utc::now().into()),
            rejection_reason: (status == PostStatus::Rejected).then(|| "spam".to_string()),
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        for role in [Role::Visitor, Role::User, Role::Editor] {
            let a = actor(role);
            assert!(matches!(
                service.approve(&a, "p1").await,
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                service.reject(&a, "p1", "spam").await,
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                service.set_featured(&a, "p1", true).await,
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                service.list_by_status(&a, None, None, 0).await,
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_approve_pending() {
        let approved = test_post(PostStatus::Approved);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // conditional update, then the audit insert (RETURNING)
            .append_exec_results([exec(1)])
            .append_query_results([[approved.clone()]])
            .append_query_results([[pawpost_db::entities::moderation_log::Model {
                id: "m1".to_string(),
                moderator_id: "a1".to_string(),
                action: ModerationAction::ApprovePost,
                target_type: TargetType::Post,
                target_id: "p1".to_string(),
                detail: None,
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let post = service(db).approve(&actor(Role::Admin), "p1").await.unwrap();

        assert_eq!(post.status, PostStatus::Approved);
        assert_eq!(post.reviewed_by.as_deref(), Some("a1"));
        assert!(post.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn test_approve_twice_is_invalid_transition() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([[test_post(PostStatus::Approved)]])
            .into_connection();

        let result = service(db).approve(&actor(Role::Admin), "p1").await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_approve_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db).approve(&actor(Role::Admin), "nope").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_reject_blank_reason_touches_nothing() {
        // No exec results queued: any write would fail the mock.
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        for reason in ["", "   ", "\n\t"] {
            let result = service.reject(&actor(Role::Admin), "p1", reason).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_reject_rejected_is_invalid_transition() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([[test_post(PostStatus::Rejected)]])
            .into_connection();

        let result = service(db)
            .reject(&actor(Role::Admin), "p1", "still spam")
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_feature_pending_is_invalid_state() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([[test_post(PostStatus::Pending)]])
            .into_connection();

        let result = service(db)
            .set_featured(&actor(Role::Admin), "p1", true)
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_unfeature_unfeatured_post_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .append_query_results([[test_post(PostStatus::Approved)]])
                .into_connection(),
        );

        let service = service_on(db.clone());
        let post = service
            .set_featured(&actor(Role::Admin), "p1", false)
            .await
            .unwrap();
        assert!(!post.is_featured);
        drop(service);

        // The conditional update and the re-read, nothing else.
        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(!format!("{log:?}").contains("moderation_log"));
    }

    #[tokio::test]
    async fn test_unfeature_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db)
            .set_featured(&actor(Role::Admin), "nope", false)
            .await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}

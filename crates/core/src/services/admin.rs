//! Admin dashboard: site statistics and the moderation log.

use std::collections::HashMap;

use pawpost_common::AppResult;
use pawpost_db::{
    entities::{moderation_log, post::PostStatus},
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use serde::Serialize;

use super::{
    audit::AuditService,
    identity::{Actor, Capability},
};

/// Site-wide counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteStats {
    pub users: u64,
    pub posts_pending: u64,
    pub posts_approved: u64,
    pub posts_rejected: u64,
    pub comments: u64,
    pub likes: i64,
}

/// A moderation log entry with the moderator's display name.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub entry: moderation_log::Model,
    pub moderator_name: Option<String>,
}

/// Admin service for business logic.
#[derive(Clone)]
pub struct AdminService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    audit: AuditService,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        audit: AuditService,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            comment_repo,
            audit,
        }
    }

    /// Counters for the admin dashboard.
    pub async fn stats(&self, actor: &Actor) -> AppResult<SiteStats> {
        actor.require(Capability::Moderate)?;

        Ok(SiteStats {
            users: self.user_repo.count().await?,
            posts_pending: self.post_repo.count_by_status(PostStatus::Pending).await?,
            posts_approved: self.post_repo.count_by_status(PostStatus::Approved).await?,
            posts_rejected: self.post_repo.count_by_status(PostStatus::Rejected).await?,
            comments: self.comment_repo.count().await?,
            likes: self.post_repo.total_likes().await?,
        })
    }

    /// Latest moderation log entries, newest first.
    pub async fn logs(&self, actor: &Actor, limit: u64) -> AppResult<Vec<LogEntry>> {
        actor.require(Capability::Moderate)?;

        let entries = self.audit.recent(limit).await?;

        let mut ids: Vec<String> = entries.iter().map(|e| e.moderator_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let names: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| LogEntry {
                moderator_name: names.get(&entry.moderator_id).cloned(),
                entry,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::Role;
    use chrono::Utc;
    use pawpost_common::AppError;
    use pawpost_db::{
        entities::{
            moderation_log::{ModerationAction, TargetType},
            user,
        },
        repositories::ModerationLogRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> AdminService {
        let db = Arc::new(db);
        AdminService::new(
            UserRepository::new(db.clone()),
            PostRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            AuditService::new(ModerationLogRepository::new(db)),
        )
    }

    fn actor(role: Role) -> Actor {
        Actor {
            id: "admin1".to_string(),
            name: "Admin".to_string(),
            role,
        }
    }

    fn count(n: i64) -> [std::collections::BTreeMap<&'static str, Value>; 1] {
        [maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }]
    }

    #[tokio::test]
    async fn test_stats_requires_admin() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = service.stats(&actor(Role::Editor)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_stats() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count(7)])
            .append_query_results([count(2)])
            .append_query_results([count(5)])
            .append_query_results([count(1)])
            .append_query_results([count(9)])
            .append_query_results([[maplit::btreemap! { "total" => Value::BigInt(Some(42)) }]])
            .into_connection();

        let stats = service(db).stats(&actor(Role::Admin)).await.unwrap();
        assert_eq!(
            stats,
            SiteStats {
                users: 7,
                posts_pending: 2,
                posts_approved: 5,
                posts_rejected: 1,
                comments: 9,
                likes: 42,
            }
        );
    }

    #[tokio::test]
    async fn test_logs_carry_moderator_name() {
        let entry = moderation_log::Model {
            id: "m1".to_string(),
            moderator_id: "admin1".to_string(),
            action: ModerationAction::ApprovePost,
            target_type: TargetType::Post,
            target_id: "p1".to_string(),
            detail: None,
            created_at: Utc::now().into(),
        };
        let moderator = user::Model {
            id: "admin1".to_string(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            token: None,
            role: Role::Admin,
            is_active: true,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[entry]])
            .append_query_results([[moderator]])
            .into_connection();

        let logs = service(db).logs(&actor(Role::Admin), 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].moderator_name.as_deref(), Some("Admin"));
    }
}

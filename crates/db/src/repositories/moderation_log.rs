//! Moderation audit log repository.

use std::sync::Arc;

use crate::entities::{ModerationLog, moderation_log};
use pawpost_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};

/// Moderation log repository for database operations.
#[derive(Clone)]
pub struct ModerationLogRepository {
    db: Arc<DatabaseConnection>,
}

impl ModerationLogRepository {
    /// Create a new moderation log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry.
    pub async fn create(
        &self,
        model: moderation_log::ActiveModel,
    ) -> AppResult<moderation_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Latest entries, newest first.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<moderation_log::Model>> {
        ModerationLog::find()
            .order_by_desc(moderation_log::Column::CreatedAt)
            .order_by_desc(moderation_log::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::moderation_log::{ModerationAction, TargetType};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_recent() {
        let entry = moderation_log::Model {
            id: "m1".to_string(),
            moderator_id: "admin1".to_string(),
            action: ModerationAction::RejectPost,
            target_type: TargetType::Post,
            target_id: "p1".to_string(),
            detail: Some("spam".to_string()),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry.clone()]])
                .into_connection(),
        );

        let repo = ModerationLogRepository::new(db);
        let result = repo.find_recent(100).await.unwrap();

        assert_eq!(result, vec![entry]);
    }
}

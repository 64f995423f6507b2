//! Moderation audit trail.

use pawpost_common::{AppResult, IdGenerator};
use pawpost_db::{entities::moderation_log, repositories::ModerationLogRepository};
use sea_orm::Set;

pub use pawpost_db::entities::moderation_log::{ModerationAction, TargetType};

use super::identity::Actor;

/// Appends moderator actions to the audit log.
#[derive(Clone)]
pub struct AuditService {
    log_repo: ModerationLogRepository,
    id_gen: IdGenerator,
}

impl AuditService {
    /// Create a new audit service.
    #[must_use]
    pub const fn new(log_repo: ModerationLogRepository) -> Self {
        Self {
            log_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record an action. Failures are logged and swallowed: the action itself
    /// has already been applied.
    pub async fn record(
        &self,
        moderator: &Actor,
        action: ModerationAction,
        target_type: TargetType,
        target_id: &str,
        detail: Option<String>,
    ) {
        let entry = moderation_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            moderator_id: Set(moderator.id.clone()),
            action: Set(action),
            target_type: Set(target_type),
            target_id: Set(target_id.to_string()),
            detail: Set(detail),
            created_at: Set(chrono::Utc::now().into()),
        };

        if let Err(e) = self.log_repo.create(entry).await {
            tracing::warn!(
                error = %e,
                moderator_id = %moderator.id,
                action = ?action,
                target_id = target_id,
                "Failed to write moderation log entry"
            );
        }
    }

    /// Latest entries, newest first.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<moderation_log::Model>> {
        self.log_repo.find_recent(limit).await
    }
}

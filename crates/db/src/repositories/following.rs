//! Following repository.

use std::sync::Arc;

use crate::entities::{Following, User, following, user};
use pawpost_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, OnConflict},
};

/// Outcome of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowToggle {
    /// Whether the follower follows the followee after the toggle.
    pub following: bool,
    /// The followee's follower count after the toggle.
    pub followers_count: i32,
}

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let count = Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Flip the (follower, followee) pair and keep both users' counters in step.
    ///
    /// Same shape as the like toggle: counters move only when the delete or
    /// the conflict-ignoring insert actually touched a row.
    pub async fn toggle(&self, edge: following::Model) -> AppResult<FollowToggle> {
        let follower_id = edge.follower_id.clone();
        let followee_id = edge.followee_id.clone();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let removed = Following::delete_many()
            .filter(following::Column::FollowerId.eq(follower_id.as_str()))
            .filter(following::Column::FolloweeId.eq(followee_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        let now_following = if removed > 0 {
            adjust_counts(&txn, &follower_id, &followee_id, -1).await?;
            false
        } else {
            let model = following::ActiveModel {
                id: Set(edge.id),
                follower_id: Set(edge.follower_id),
                followee_id: Set(edge.followee_id),
                created_at: Set(edge.created_at),
            };
            let inserted = Following::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        following::Column::FollowerId,
                        following::Column::FolloweeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if inserted > 0 {
                adjust_counts(&txn, &follower_id, &followee_id, 1).await?;
            }
            true
        };

        let followers_count: Option<i32> = User::find_by_id(followee_id.as_str())
            .select_only()
            .column(user::Column::FollowersCount)
            .into_tuple()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(FollowToggle {
            following: now_following,
            followers_count: followers_count.unwrap_or(0),
        })
    }

    /// Follow edges pointing at a user, newest first.
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        Following::find()
            .filter(following::Column::FolloweeId.eq(user_id))
            .order_by_desc(following::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Follow edges starting at a user, newest first.
    pub async fn find_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(user_id))
            .order_by_desc(following::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn adjust_counts(
    txn: &DatabaseTransaction,
    follower_id: &str,
    followee_id: &str,
    delta: i32,
) -> AppResult<()> {
    let (followers_expr, following_expr) = if delta > 0 {
        (
            Expr::col(user::Column::FollowersCount).add(delta),
            Expr::col(user::Column::FollowingCount).add(delta),
        )
    } else {
        (
            Expr::cust("GREATEST(followers_count - 1, 0)"),
            Expr::cust("GREATEST(following_count - 1, 0)"),
        )
    };

    User::update_many()
        .col_expr(user::Column::FollowersCount, followers_expr)
        .filter(user::Column::Id.eq(followee_id))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    User::update_many()
        .col_expr(user::Column::FollowingCount, following_expr)
        .filter(user::Column::Id.eq(follower_id))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}

//! Post like repository.

use std::{collections::HashSet, sync::Arc};

use crate::entities::{Post, PostLike, post, post_like};
use pawpost_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
    sea_query::{Expr, OnConflict},
};

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// Whether the pair exists after the toggle.
    pub liked: bool,
    /// The post's like count after the toggle.
    pub count: i32,
}

/// Post like repository for database operations.
#[derive(Clone)]
pub struct PostLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user has liked a post.
    pub async fn has_liked(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        let count = PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Which of the given posts the user has liked.
    pub async fn liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(ids.into_iter().collect())
    }

    /// Flip the (post, user) pair and keep `post.likes_count` in step.
    ///
    /// Runs in one transaction. The delete and the conflict-ignoring insert
    /// report how many rows they touched, and the counter only moves when a
    /// row actually changed, so a caller that loses a race observes the
    /// winner's state without double counting.
    pub async fn toggle(&self, like: post_like::Model) -> AppResult<LikeToggle> {
        let post_id = like.post_id.clone();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let removed = PostLike::delete_many()
            .filter(post_like::Column::PostId.eq(like.post_id.as_str()))
            .filter(post_like::Column::UserId.eq(like.user_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        let liked = if removed > 0 {
            Post::update_many()
                .col_expr(
                    post::Column::LikesCount,
                    Expr::cust("GREATEST(likes_count - 1, 0)"),
                )
                .filter(post::Column::Id.eq(post_id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            false
        } else {
            let model = post_like::ActiveModel {
                id: Set(like.id),
                post_id: Set(like.post_id),
                user_id: Set(like.user_id),
                created_at: Set(like.created_at),
            };
            let inserted = PostLike::insert(model)
                .on_conflict(
                    OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if inserted > 0 {
                Post::update_many()
                    .col_expr(
                        post::Column::LikesCount,
                        Expr::col(post::Column::LikesCount).add(1),
                    )
                    .filter(post::Column::Id.eq(post_id.as_str()))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            true
        };

        let count: Option<i32> = Post::find_by_id(post_id.as_str())
            .select_only()
            .column(post::Column::LikesCount)
            .into_tuple()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(LikeToggle {
            liked,
            count: count.unwrap_or(0),
        })
    }

    /// Count all likes.
    pub async fn count(&self) -> AppResult<u64> {
        PostLike::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

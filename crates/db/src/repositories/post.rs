//! Post repository.
//!
//! Status changes go through the conditional updates in this module
//! ([`PostRepository::approve`], [`PostRepository::reject`],
//! [`PostRepository::set_featured`]). Each one carries the expected current
//! status in its `WHERE` clause, so of two concurrent callers exactly one
//! sees `rows_affected == 1`.

use std::sync::Arc;

use crate::entities::{
    Post, post,
    post::{Category, PostStatus},
};
use chrono::{DateTime, Utc};
use pawpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Newest first.
    #[default]
    Newest,
    /// Most likes first, newest breaking ties.
    MostLiked,
    /// Most recently featured first.
    RecentlyFeatured,
}

/// Criteria for listing posts.
///
/// `statuses` is an allow-list: an empty list matches nothing.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Statuses a row may have.
    pub statuses: Vec<PostStatus>,
    /// Restrict to one author.
    pub author_id: Option<String>,
    /// Restrict to one category.
    pub category: Option<Category>,
    /// Restrict to posts carrying this (normalized) tag.
    pub tag: Option<String>,
    /// Case-insensitive substring of title or content.
    pub search: Option<String>,
    /// Only featured posts.
    pub featured_only: bool,
    /// Sort order.
    pub order: PostOrder,
}

impl PostFilter {
    /// Filter with the given status allow-list.
    #[must_use]
    pub fn with_statuses(statuses: Vec<PostStatus>) -> Self {
        Self {
            statuses,
            ..Self::default()
        }
    }

    fn condition(&self) -> Condition {
        let mut cond = Condition::all().add(post::Column::Status.is_in(self.statuses.clone()));

        if let Some(author_id) = &self.author_id {
            cond = cond.add(post::Column::UserId.eq(author_id.as_str()));
        }
        if let Some(category) = self.category {
            cond = cond.add(post::Column::Category.eq(category));
        }
        if let Some(tag) = &self.tag {
            cond = cond.add(Expr::cust_with_values(
                "\"post\".\"tags\" @> ?",
                [serde_json::json!([tag])],
            ));
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            cond = cond.add(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(pattern.as_str()))
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Content))).like(pattern.as_str())),
            );
        }
        if self.featured_only {
            cond = cond.add(post::Column::IsFeatured.eq(true));
        }
        cond
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Returns `false` if nothing was deleted.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// List posts matching a filter.
    pub async fn find_filtered(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(filter.condition());

        query = match filter.order {
            PostOrder::Newest => query
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id),
            PostOrder::MostLiked => query
                .order_by_desc(post::Column::LikesCount)
                .order_by_desc(post::Column::CreatedAt),
            PostOrder::RecentlyFeatured => query
                .order_by_desc(post::Column::FeaturedAt)
                .order_by_desc(post::Column::CreatedAt),
        };

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts matching a filter.
    pub async fn count_filtered(&self, filter: &PostFilter) -> AppResult<u64> {
        Post::find()
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts in a status.
    pub async fn count_by_status(&self, status: PostStatus) -> AppResult<u64> {
        self.count_filtered(&PostFilter::with_statuses(vec![status]))
            .await
    }

    /// Sum of all like counters.
    pub async fn total_likes(&self) -> AppResult<i64> {
        let total: Option<Option<i64>> = Post::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(likes_count), 0)::bigint"), "total")
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(total.flatten().unwrap_or(0))
    }

    /// Move a pending post to approved.
    ///
    /// Returns `false` when the post is missing or no longer pending.
    pub async fn approve(
        &self,
        id: &str,
        reviewer_id: &str,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = Post::update_many()
            .col_expr(post::Column::Status, Expr::value(PostStatus::Approved.as_str()))
            .col_expr(post::Column::ReviewedBy, Expr::value(reviewer_id))
            .col_expr(post::Column::ReviewedAt, Expr::value(at))
            .col_expr(post::Column::RejectionReason, Expr::value(Option::<String>::None))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(PostStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Move a pending post to rejected.
    ///
    /// Returns `false` when the post is missing or no longer pending.
    pub async fn reject(
        &self,
        id: &str,
        reviewer_id: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = Post::update_many()
            .col_expr(post::Column::Status, Expr::value(PostStatus::Rejected.as_str()))
            .col_expr(post::Column::ReviewedBy, Expr::value(reviewer_id))
            .col_expr(post::Column::ReviewedAt, Expr::value(at))
            .col_expr(post::Column::RejectionReason, Expr::value(reason))
            .col_expr(post::Column::IsFeatured, Expr::value(false))
            .col_expr(
                post::Column::FeaturedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(PostStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Set or clear the featured flag.
    ///
    /// Featuring only matches approved posts; clearing matches any status
    /// but only posts that are currently featured. Returns `false` when no
    /// row matched.
    pub async fn set_featured(
        &self,
        id: &str,
        value: bool,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let featured_at = value.then_some(at);
        let mut update = Post::update_many()
            .col_expr(post::Column::IsFeatured, Expr::value(value))
            .col_expr(post::Column::FeaturedAt, Expr::value(featured_at))
            .filter(post::Column::Id.eq(id));

        update = if value {
            update.filter(post::Column::Status.eq(PostStatus::Approved))
        } else {
            update.filter(post::Column::IsFeatured.eq(true))
        };

        let result = update
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_post(id: &str, status: PostStatus) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: "author1".to_string(),
            title: "Whiskers".to_string(),
            content: "A cat named Whiskers".to_string(),
            category: Category::Cats,
            image_url: None,
            tags: serde_json::json!(["tabby"]),
            status,
            is_featured: false,
            featured_at: None,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
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

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_cat\\"), "100\\%\\_cat\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_tag_names_from_json() {
        let post = create_test_post("p1", PostStatus::Approved);
        assert_eq!(post.tag_names(), vec!["tabby".to_string()]);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_filtered_applies_status_filter() {
        let post = create_test_post("p1", PostStatus::Approved);

        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post.clone()]])
            .into_connection();
        let db = Arc::new(mock);

        let repo = PostRepository::new(db.clone());
        let filter = PostFilter {
            tag: Some("tabby".to_string()),
            ..PostFilter::with_statuses(vec![PostStatus::Approved])
        };
        let result = repo.find_filtered(&filter, 10, 0).await.unwrap();
        assert_eq!(result.len(), 1);
        drop(repo);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("IN"));
        assert!(sql.contains("@>"));
    }

    #[tokio::test]
    async fn test_approve_wins_once() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0)])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let now = Utc::now();
        assert!(repo.approve("p1", "admin1", now).await.unwrap());
        assert!(!repo.approve("p1", "admin2", now).await.unwrap());
    }

    #[tokio::test]
    async fn test_reject_not_pending() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.reject("p1", "admin1", "spam", Utc::now()).await.unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn test_set_featured_requires_approved_status() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let db = Arc::new(mock);

        let repo = PostRepository::new(db.clone());
        assert!(repo.set_featured("p1", true, Utc::now()).await.unwrap());
        drop(repo);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("approved"));
    }

    #[tokio::test]
    async fn test_clear_featured_only_matches_featured_posts() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();
        let db = Arc::new(mock);

        let repo = PostRepository::new(db.clone());
        assert!(!repo.set_featured("p1", false, Utc::now()).await.unwrap());
        drop(repo);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains(r#"\"is_featured\" = "#));
        assert!(!sql.contains("approved"));
    }
}

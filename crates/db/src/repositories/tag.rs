//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use pawpost_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, OnConflict},
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find tags by name.
    pub async fn find_by_names(&self, names: &[String]) -> AppResult<Vec<tag::Model>> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        Tag::find()
            .filter(tag::Column::Name.is_in(names.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most used tags.
    pub async fn find_top(&self, limit: u64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .filter(tag::Column::PostsCount.gt(0))
            .order_by_desc(tag::Column::PostsCount)
            .order_by_asc(tag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert tag rows that do not exist yet.
    pub async fn ensure(&self, tags: Vec<tag::ActiveModel>) -> AppResult<()> {
        if tags.is_empty() {
            return Ok(());
        }

        Tag::insert_many(tags)
            .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Add one approved post to each named tag.
    pub async fn increment(&self, names: &[String]) -> AppResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        Tag::update_many()
            .col_expr(
                tag::Column::PostsCount,
                Expr::col(tag::Column::PostsCount).add(1),
            )
            .filter(tag::Column::Name.is_in(names.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove one approved post from each named tag.
    pub async fn decrement(&self, names: &[String]) -> AppResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        Tag::update_many()
            .col_expr(
                tag::Column::PostsCount,
                Expr::cust("GREATEST(posts_count - 1, 0)"),
            )
            .filter(tag::Column::Name.is_in(names.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(name: &str, posts_count: i32) -> tag::Model {
        tag::Model {
            id: format!("t-{name}"),
            name: name.to_string(),
            color: "#f59e0b".to_string(),
            posts_count,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_top() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag("tabby", 4), create_test_tag("pug", 2)]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.find_top(10).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "tabby");
    }

    #[tokio::test]
    async fn test_empty_inputs_skip_queries() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = TagRepository::new(db);
        assert!(repo.find_by_names(&[]).await.unwrap().is_empty());
        repo.ensure(vec![]).await.unwrap();
        repo.increment(&[]).await.unwrap();
        repo.decrement(&[]).await.unwrap();
    }
}

//! Post store: authoring, reading and listing posts.
//!
//! Status never changes here; see [`super::moderation`].

use std::collections::HashMap;

use chrono::Utc;
use pawpost_common::{AppError, AppResult, Config, IdGenerator, config::FeedConfig};
use pawpost_db::{
    entities::{
        post::{self, Category, PostStatus},
        user,
    },
    repositories::{PostLikeRepository, PostOrder, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::{
    audit::{AuditService, ModerationAction, TargetType},
    identity::{Actor, Capability},
    tag::{TagBadge, TagService, badges, normalize_tags},
    visibility::{PostQuery, can_view, scope_for},
};

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    pub category: Category,

    #[validate(length(max = 2048))]
    pub image_url: Option<String>,

    #[serde(default, alias = "hashtags")]
    pub tags: Vec<String>,
}

impl CreatePostInput {
    fn trimmed(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
        self.image_url = self
            .image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self
    }
}

/// Patch for an existing post. Absent fields are left alone; an empty
/// `image_url` clears the image.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub category: Option<Category>,

    #[validate(length(max = 2048))]
    pub image_url: Option<String>,

    #[serde(alias = "hashtags")]
    pub tags: Option<Vec<String>>,
}

impl UpdatePostInput {
    fn trimmed(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.content = self.content.map(|c| c.trim().to_string());
        self.image_url = self.image_url.map(|u| u.trim().to_string());
        self
    }
}

/// Listing options on top of the visibility scope.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub category: Option<Category>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub featured_only: bool,
    pub order: PostOrder,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// A post together with what it is rendered with.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: post::Model,
    pub tags: Vec<TagBadge>,
    pub author_name: Option<String>,
    pub reviewer_name: Option<String>,
    pub liked_by_me: bool,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    like_repo: PostLikeRepository,
    tags: TagService,
    audit: AuditService,
    id_gen: IdGenerator,
    feed: FeedConfig,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        like_repo: PostLikeRepository,
        tags: TagService,
        audit: AuditService,
        config: &Config,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            like_repo,
            tags,
            audit,
            id_gen: IdGenerator::new(),
            feed: config.feed.clone(),
        }
    }

    /// Create a post. It starts out pending.
    pub async fn create(&self, actor: &Actor, input: CreatePostInput) -> AppResult<post::Model> {
        actor.require(Capability::Author)?;
        let input = input.trimmed();
        input.validate()?;
        let tags = normalize_tags(&input.tags)?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor.id.clone()),
            title: Set(input.title),
            content: Set(input.content),
            category: Set(input.category),
            image_url: Set(input.image_url),
            tags: Set(serde_json::json!(tags)),
            status: Set(PostStatus::Pending),
            is_featured: Set(false),
            featured_at: Set(None),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            rejection_reason: Set(None),
            likes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        self.user_repo.increment_posts_count(&actor.id).await?;

        tracing::info!(post_id = %post.id, author_id = %actor.id, "Post created");
        Ok(post)
    }

    /// Edit a post. Only its author may do so; status is left untouched.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        let post = self.get_visible(Some(actor), id).await?;
        if !actor.is(&post.user_id) {
            return Err(AppError::Forbidden(
                "only the author may edit a post".to_string(),
            ));
        }
        actor.require(Capability::Author)?;

        let input = input.trimmed();
        input.validate()?;

        let old_tags = post.tag_names();
        let new_tags = input.tags.as_deref().map(normalize_tags).transpose()?;
        let status = post.status;

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url).filter(|u| !u.is_empty()));
        }
        if let Some(tags) = &new_tags {
            active.tags = Set(serde_json::json!(tags));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;

        if status == PostStatus::Approved
            && let Some(new_tags) = new_tags
            && let Err(e) = self.tags.record_retagged(&old_tags, &new_tags).await
        {
            tracing::warn!(error = %e, post_id = %updated.id, "Failed to update tag counts");
        }

        Ok(updated)
    }

    /// Delete a post. Allowed for its author and for moderators.
    pub async fn delete(&self, actor: &Actor, id: &str) -> AppResult<()> {
        let post = self.get_visible(Some(actor), id).await?;
        let is_author = actor.is(&post.user_id) && actor.can(Capability::Author);
        if !is_author && !actor.can(Capability::Moderate) {
            return Err(AppError::Forbidden(
                "only the author or an admin may delete a post".to_string(),
            ));
        }

        if !self.post_repo.delete(&post.id).await? {
            return Err(AppError::PostNotFound(post.id));
        }
        self.user_repo.decrement_posts_count(&post.user_id).await?;

        if post.status == PostStatus::Approved
            && let Err(e) = self.tags.record_withdrawn(&post.tag_names()).await
        {
            tracing::warn!(error = %e, post_id = %post.id, "Failed to update tag counts");
        }

        if !actor.is(&post.user_id) {
            self.audit
                .record(
                    actor,
                    ModerationAction::DeletePost,
                    TargetType::Post,
                    &post.id,
                    Some(post.title.clone()),
                )
                .await;
        }

        tracing::info!(post_id = %post.id, deleted_by = %actor.id, "Post deleted");
        Ok(())
    }

    /// Read one post. Posts the caller may not see are reported as missing.
    pub async fn get_visible(&self, actor: Option<&Actor>, id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(id).await?;
        if can_view(actor, &post) {
            Ok(post)
        } else {
            Err(AppError::PostNotFound(id.to_string()))
        }
    }

    /// List posts for a query, scoped by the visibility filter.
    pub async fn list(
        &self,
        actor: Option<&Actor>,
        query: &PostQuery,
        options: ListOptions,
    ) -> AppResult<Vec<post::Model>> {
        let mut filter = scope_for(actor, query)?.into_filter();
        filter.category = options.category;
        filter.tag = options
            .tag
            .map(|t| t.trim().trim_start_matches('#').to_lowercase())
            .filter(|t| !t.is_empty());
        filter.search = options.search;
        filter.featured_only = options.featured_only;
        filter.order = options.order;

        let limit = self.feed.clamp(options.limit);
        self.post_repo
            .find_filtered(&filter, limit, options.offset)
            .await
    }

    /// Case-insensitive search over title and content of approved posts.
    pub async fn search(
        &self,
        actor: Option<&Actor>,
        text: &str,
        limit: Option<u64>,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }

        self.list(
            actor,
            &PostQuery::Search,
            ListOptions {
                search: Some(text.to_string()),
                limit,
                offset,
                ..ListOptions::default()
            },
        )
        .await
    }

    /// The most recently featured approved post.
    pub async fn featured(&self, actor: Option<&Actor>) -> AppResult<Option<post::Model>> {
        let posts = self
            .list(
                actor,
                &PostQuery::PublicFeed,
                ListOptions {
                    featured_only: true,
                    order: PostOrder::RecentlyFeatured,
                    limit: Some(1),
                    ..ListOptions::default()
                },
            )
            .await?;
        Ok(posts.into_iter().next())
    }

    /// Attach author and reviewer names, tag colors and the caller's like state.
    pub async fn hydrate(
        &self,
        actor: Option<&Actor>,
        posts: Vec<post::Model>,
    ) -> AppResult<Vec<PostDetails>> {
        let mut user_ids: Vec<String> = posts
            .iter()
            .flat_map(|p| std::iter::once(p.user_id.clone()).chain(p.reviewed_by.clone()))
            .collect();
        user_ids.sort();
        user_ids.dedup();

        let names: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u: user::Model| (u.id, u.name))
            .collect();

        let liked = match actor {
            Some(actor) => {
                let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
                self.like_repo.liked_post_ids(&actor.id, &post_ids).await?
            }
            None => Default::default(),
        };

        Ok(posts
            .into_iter()
            .map(|post| PostDetails {
                tags: badges(&post.tag_names()),
                author_name: names.get(&post.user_id).cloned(),
                reviewer_name: post
                    .reviewed_by
                    .as_ref()
                    .and_then(|id| names.get(id).cloned()),
                liked_by_me: liked.contains(&post.id),
                post,
            })
            .collect())
    }

    /// Hydrate a single post.
    pub async fn hydrate_one(
        &self,
        actor: Option<&Actor>,
        post: post::Model,
    ) -> AppResult<PostDetails> {
        self.hydrate(actor, vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("hydration dropped a post".to_string()))
    }
}

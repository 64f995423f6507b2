//! Engagement ledger: likes, comments and follows.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use pawpost_common::{AppError, AppResult, IdGenerator};
use pawpost_db::{
    entities::{comment, following, post_like, user},
    repositories::{
        CommentRepository, FollowToggle, FollowingRepository, LikeToggle, PostLikeRepository,
        UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

use super::{
    audit::{AuditService, ModerationAction, TargetType},
    identity::{Actor, Capability, require_actor},
    post::PostService,
};

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_LEN: usize = 1000;

/// A comment with its author.
#[derive(Debug, Clone)]
pub struct CommentDetails {
    pub comment: comment::Model,
    /// `None` when the author no longer exists.
    pub author: Option<Actor>,
}

/// One side of a follow relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowEntry {
    pub id: String,
    pub name: String,
    pub followed_at: DateTime<FixedOffset>,
}

/// Engagement service for business logic.
#[derive(Clone)]
pub struct EngagementService {
    posts: PostService,
    like_repo: PostLikeRepository,
    comment_repo: CommentRepository,
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    audit: AuditService,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(
        posts: PostService,
        like_repo: PostLikeRepository,
        comment_repo: CommentRepository,
        following_repo: FollowingRepository,
        user_repo: UserRepository,
        audit: AuditService,
    ) -> Self {
        Self {
            posts,
            like_repo,
            comment_repo,
            following_repo,
            user_repo,
            audit,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Likes ==========

    /// Like or unlike a post the caller can see.
    pub async fn toggle_like(&self, actor: Option<&Actor>, post_id: &str) -> AppResult<LikeToggle> {
        let actor = require_actor(actor)?;
        let post = self.posts.get_visible(Some(actor), post_id).await?;

        let result = self
            .like_repo
            .toggle(post_like::Model {
                id: self.id_gen.generate(),
                post_id: post.id,
                user_id: actor.id.clone(),
                created_at: Utc::now().into(),
            })
            .await?;

        tracing::debug!(post_id = post_id, user_id = %actor.id, liked = result.liked, "Like toggled");
        Ok(result)
    }

    /// Like count of a post the caller can see.
    pub async fn like_count(&self, actor: Option<&Actor>, post_id: &str) -> AppResult<i32> {
        Ok(self.posts.get_visible(actor, post_id).await?.likes_count)
    }

    // ========== Comments ==========

    /// Comment on a post the caller can see.
    pub async fn add_comment(
        &self,
        actor: Option<&Actor>,
        post_id: &str,
        content: &str,
    ) -> AppResult<CommentDetails> {
        let actor = require_actor(actor)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("comment cannot be empty".to_string()));
        }
        if content.chars().count() > MAX_COMMENT_LEN {
            return Err(AppError::Validation(format!(
                "comment is longer than {MAX_COMMENT_LEN} characters"
            )));
        }

        let post = self.posts.get_visible(Some(actor), post_id).await?;

        let comment = self
            .comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post.id),
                user_id: Set(actor.id.clone()),
                content: Set(content.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        Ok(CommentDetails {
            comment,
            author: Some(actor.clone()),
        })
    }

    /// Comments on a post the caller can see, oldest first.
    pub async fn list_comments(
        &self,
        actor: Option<&Actor>,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<CommentDetails>> {
        let post = self.posts.get_visible(actor, post_id).await?;
        let comments = self.comment_repo.find_by_post(&post.id, limit, offset).await?;
        self.with_authors(comments).await
    }

    /// Every comment, newest first. Moderators only.
    pub async fn list_all_comments(
        &self,
        actor: &Actor,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<CommentDetails>> {
        actor.require(Capability::Moderate)?;
        let comments = self.comment_repo.find_all(limit, offset).await?;
        self.with_authors(comments).await
    }

    /// Delete a comment. Allowed for its author and for moderators.
    pub async fn delete_comment(&self, actor: &Actor, comment_id: &str) -> AppResult<()> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

        let is_author = actor.is(&comment.user_id);
        if !is_author && !actor.can(Capability::Moderate) {
            return Err(AppError::Forbidden(
                "only the author or an admin may delete a comment".to_string(),
            ));
        }

        if !self.comment_repo.delete(&comment).await? {
            return Err(AppError::NotFound(format!("comment {comment_id}")));
        }

        if !is_author {
            self.audit
                .record(
                    actor,
                    ModerationAction::DeleteComment,
                    TargetType::Comment,
                    comment_id,
                    Some(comment.content),
                )
                .await;
        }
        Ok(())
    }

    async fn with_authors(
        &self,
        comments: Vec<comment::Model>,
    ) -> AppResult<Vec<CommentDetails>> {
        let mut ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let authors: HashMap<String, Actor> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), Actor::from(u)))
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| CommentDetails {
                author: authors.get(&comment.user_id).cloned(),
                comment,
            })
            .collect())
    }

    // ========== Follows ==========

    /// Follow or unfollow another user.
    pub async fn toggle_follow(
        &self,
        actor: Option<&Actor>,
        followee_id: &str,
    ) -> AppResult<FollowToggle> {
        let actor = require_actor(actor)?;
        if actor.is(followee_id) {
            return Err(AppError::Validation("you cannot follow yourself".to_string()));
        }

        let followee = self.user_repo.get_by_id(followee_id).await?;

        let result = self
            .following_repo
            .toggle(following::Model {
                id: self.id_gen.generate(),
                follower_id: actor.id.clone(),
                followee_id: followee.id,
                created_at: Utc::now().into(),
            })
            .await?;

        tracing::debug!(
            follower_id = %actor.id,
            followee_id = followee_id,
            following = result.following,
            "Follow toggled"
        );
        Ok(result)
    }

    /// Whether `follower_id` follows `followee_id`.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Users following a user.
    pub async fn followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<FollowEntry>> {
        self.user_repo.get_by_id(user_id).await?;
        let edges = self
            .following_repo
            .find_followers(user_id, limit, offset)
            .await?;
        self.entries(edges, |edge| &edge.follower_id).await
    }

    /// Users a user follows.
    pub async fn following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<FollowEntry>> {
        self.user_repo.get_by_id(user_id).await?;
        let edges = self
            .following_repo
            .find_following(user_id, limit, offset)
            .await?;
        self.entries(edges, |edge| &edge.followee_id).await
    }

    async fn entries(
        &self,
        edges: Vec<following::Model>,
        other: impl Fn(&following::Model) -> &String,
    ) -> AppResult<Vec<FollowEntry>> {
        let ids: Vec<String> = edges.iter().map(|e| other(e).clone()).collect();
        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(edges
            .iter()
            .filter_map(|edge| {
                users.get(other(edge)).map(|u| FollowEntry {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    followed_at: edge.created_at,
                })
            })
            .collect())
    }
}

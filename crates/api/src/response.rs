//! API response types.
//!
//! Bodies are plain JSON documents. Role flags (`isEditor`, `isAdmin`) are
//! derived here from the role and never stored.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use pawpost_core::{
    Actor, Capability, CommentDetails, LogEntry, PostDetails, Profile, Role,
    TagBadge, role_can,
};
use pawpost_db::entities::{
    moderation_log::{ModerationAction, TargetType},
    post::{Category, PostStatus},
    tag, user,
};
use serde::Serialize;

/// `201 Created` with a JSON body.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Account as returned to its owner and to admins.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "isEditor")]
    pub is_editor: bool,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            is_editor: role_can(user.role, Capability::Author),
            is_admin: role_can(user.role, Capability::Moderate),
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Row of the admin user list.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(rename = "postsCount")]
    pub posts_count: i32,
}

impl From<user::Model> for AdminUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            posts_count: user.posts_count,
            user: user.into(),
        }
    }
}

/// Session issued by login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<FixedOffset>,
    pub posts_count: u64,
    pub followers_count: i32,
    pub following_count: i32,
    #[serde(rename = "isFollowing")]
    pub is_following: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        let user = profile.user;
        Self {
            email: profile.show_email.then_some(user.email),
            id: user.id,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
            posts_count: profile.posts_count,
            followers_count: user.followers_count,
            following_count: user.following_count,
            is_following: profile.is_following,
        }
    }
}

/// Author summary embedded in comments.
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(rename = "isEditor")]
    pub is_editor: bool,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<Actor> for AuthorResponse {
    fn from(actor: Actor) -> Self {
        Self {
            is_editor: actor.can(Capability::Author),
            is_admin: actor.can(Capability::Moderate),
            id: actor.id,
            name: actor.name,
            role: actor.role,
        }
    }
}

/// Post as rendered in feeds and detail views.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub tags: Vec<TagBadge>,
    pub user_id: String,
    pub author_name: Option<String>,
    #[serde(rename = "likesCount")]
    pub likes_count: i32,
    #[serde(rename = "commentsCount")]
    pub comments_count: i32,
    #[serde(rename = "isLikedByMe")]
    pub is_liked_by_me: bool,
    pub is_featured: bool,
    pub featured_at: Option<DateTime<FixedOffset>>,
    pub status: PostStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<FixedOffset>>,
    pub rejection_reason: Option<String>,
    pub reviewer_name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<PostDetails> for PostResponse {
    fn from(details: PostDetails) -> Self {
        let post = details.post;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            category: post.category,
            image_url: post.image_url,
            tags: details.tags,
            user_id: post.user_id,
            author_name: details.author_name,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            is_liked_by_me: details.liked_by_me,
            is_featured: post.is_featured,
            featured_at: post.featured_at,
            status: post.status,
            reviewed_by: post.reviewed_by,
            reviewed_at: post.reviewed_at,
            rejection_reason: post.rejection_reason,
            reviewer_name: details.reviewer_name,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Comment with its author.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    pub post_id: String,
    pub author: Option<AuthorResponse>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<CommentDetails> for CommentResponse {
    fn from(details: CommentDetails) -> Self {
        let comment = details.comment;
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author: details.author.map(AuthorResponse::from),
            created_at: comment.created_at,
        }
    }
}

/// Result of a like toggle.
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub count: i32,
}

/// Like count of a post.
#[derive(Debug, Serialize)]
pub struct LikeCountResponse {
    pub count: i32,
}

/// Result of a follow toggle.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub following: bool,
    pub count: i32,
}

/// Tag with its usage count.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub name: String,
    pub color: String,
    pub posts_count: i32,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            name: tag.name,
            color: tag.color,
            posts_count: tag.posts_count,
        }
    }
}

/// Moderation log entry.
#[derive(Debug, Serialize)]
pub struct LogEntryResponse {
    pub id: String,
    pub moderator_id: String,
    pub moderator_name: Option<String>,
    pub action: ModerationAction,
    pub target_type: TargetType,
    pub target_id: String,
    pub detail: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<LogEntry> for LogEntryResponse {
    fn from(log: LogEntry) -> Self {
        let entry = log.entry;
        Self {
            id: entry.id,
            moderator_id: entry.moderator_id,
            moderator_name: log.moderator_name,
            action: entry.action,
            target_type: entry.target_type,
            target_id: entry.target_id,
            detail: entry.detail,
            created_at: entry.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(role: Role) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            name: "Mia".to_string(),
            email: "mia@example.com".to_string(),
            password_hash: "secret".to_string(),
            token: Some("tok".to_string()),
            role,
            is_active: true,
            followers_count: 2,
            following_count: 1,
            posts_count: 4,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_role_flags_are_derived() {
        let editor = serde_json::to_value(UserResponse::from(test_user(Role::Editor))).unwrap();
        assert_eq!(editor["role"], "editor");
        assert_eq!(editor["isEditor"], true);
        assert_eq!(editor["isAdmin"], false);

        let admin = serde_json::to_value(UserResponse::from(test_user(Role::Admin))).unwrap();
        assert_eq!(admin["isEditor"], true);
        assert_eq!(admin["isAdmin"], true);
    }

    #[test]
    fn test_admin_user_row_is_flat() {
        let row = serde_json::to_value(AdminUserResponse::from(test_user(Role::User))).unwrap();
        assert_eq!(row["id"], "u1");
        assert_eq!(row["postsCount"], 4);
        assert!(row.get("password_hash").is_none());
    }

    #[test]
    fn test_profile_hides_email_unless_allowed() {
        let hidden = serde_json::to_value(ProfileResponse::from(Profile {
            user: test_user(Role::User),
            posts_count: 3,
            is_following: true,
            show_email: false,
        }))
        .unwrap();
        assert!(hidden.get("email").is_none());
        assert_eq!(hidden["isFollowing"], true);
        assert_eq!(hidden["posts_count"], 3);

        let shown = serde_json::to_value(ProfileResponse::from(Profile {
            user: test_user(Role::User),
            posts_count: 3,
            is_following: false,
            show_email: true,
        }))
        .unwrap();
        assert_eq!(shown["email"], "mia@example.com");
    }
}

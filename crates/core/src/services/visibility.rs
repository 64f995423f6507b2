//! Visibility filter.
//!
//! Pure decisions about which posts a caller may see. Listing queries are
//! turned into a [`PostScope`] (a status allow-list plus an optional author
//! restriction) that the post repository applies verbatim, so the public
//! surfaces cannot return unpublished posts by construction.

use pawpost_common::{AppError, AppResult};
use pawpost_db::{
    entities::post::{self, PostStatus},
    repositories::PostFilter,
};

use super::identity::{Actor, Capability, require_actor};

/// The kind of listing being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostQuery {
    /// The public feed.
    PublicFeed,
    /// Full-text search.
    Search,
    /// Another user's profile page.
    Profile {
        /// Whose posts.
        user_id: String,
    },
    /// The caller's own posts.
    MyPosts,
    /// The admin moderation queue, optionally narrowed to one tab.
    ModerationQueue {
        /// Selected tab; `None` shows every status.
        status: Option<PostStatus>,
    },
}

/// Which rows a query may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostScope {
    /// Allowed statuses.
    pub statuses: Vec<PostStatus>,
    /// Author restriction.
    pub author_id: Option<String>,
}

impl PostScope {
    fn approved() -> Self {
        Self {
            statuses: vec![PostStatus::Approved],
            author_id: None,
        }
    }

    /// Start a repository filter from this scope.
    #[must_use]
    pub fn into_filter(self) -> PostFilter {
        PostFilter {
            statuses: self.statuses,
            author_id: self.author_id,
            ..PostFilter::default()
        }
    }
}

const ALL_STATUSES: [PostStatus; 3] = [
    PostStatus::Pending,
    PostStatus::Approved,
    PostStatus::Rejected,
];

/// Resolve the scope of a listing for a caller.
///
/// Public surfaces (feed, search, profile) are approved-only for every
/// caller, admins included. Only the moderation queue bypasses that, and only
/// for callers who may moderate.
pub fn scope_for(actor: Option<&Actor>, query: &PostQuery) -> AppResult<PostScope> {
    match query {
        PostQuery::PublicFeed | PostQuery::Search => Ok(PostScope::approved()),
        PostQuery::Profile { user_id } => Ok(PostScope {
            author_id: Some(user_id.clone()),
            ..PostScope::approved()
        }),
        PostQuery::MyPosts => {
            let actor = require_actor(actor)?;
            Ok(PostScope {
                statuses: ALL_STATUSES.to_vec(),
                author_id: Some(actor.id.clone()),
            })
        }
        PostQuery::ModerationQueue { status } => {
            let actor = require_actor(actor)?;
            if !actor.can(Capability::Moderate) {
                return Err(AppError::Forbidden(
                    "the moderation queue is restricted to admins".to_string(),
                ));
            }
            Ok(PostScope {
                statuses: status.map_or_else(|| ALL_STATUSES.to_vec(), |s| vec![s]),
                author_id: None,
            })
        }
    }
}

/// Whether a caller may read a single post.
///
/// Approved posts are public. Pending and rejected posts are visible to
/// their author and to callers who may view every status.
#[must_use]
pub fn can_view(actor: Option<&Actor>, post: &post::Model) -> bool {
    if post.status == PostStatus::Approved {
        return true;
    }
    actor.is_some_and(|a| a.is(&post.user_id) || a.can(Capability::ViewAllStatuses))
}

//! Database repositories.

pub mod comment;
pub mod following;
pub mod moderation_log;
pub mod post;
pub mod post_like;
pub mod tag;
pub mod user;

pub use comment::CommentRepository;
pub use following::{FollowToggle, FollowingRepository};
pub use moderation_log::ModerationLogRepository;
pub use post::{PostFilter, PostOrder, PostRepository};
pub use post_like::{LikeToggle, PostLikeRepository};
pub use tag::TagRepository;
pub use user::UserRepository;

//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod audit;
pub mod engagement;
pub mod identity;
pub mod moderation;
pub mod post;
pub mod tag;
pub mod user;
pub mod visibility;

pub use admin::{AdminService, LogEntry, SiteStats};
pub use audit::{AuditService, ModerationAction, TargetType};
pub use engagement::{CommentDetails, EngagementService, FollowEntry, MAX_COMMENT_LEN};
pub use identity::{Actor, Capability, Role, require_actor, role_can};
pub use moderation::{MAX_REASON_LEN, ModerationService};
pub use post::{CreatePostInput, ListOptions, PostDetails, PostService, UpdatePostInput};
pub use tag::{TagBadge, TagService, color_for, normalize_tags};
pub use user::{LoginInput, Profile, RegisterInput, UserService};
pub use visibility::{PostQuery, PostScope, can_view, scope_for};

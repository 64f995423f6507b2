//! Moderation audit log entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audited moderator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    #[sea_orm(string_value = "approve_post")]
    ApprovePost,
    #[sea_orm(string_value = "reject_post")]
    RejectPost,
    #[sea_orm(string_value = "feature_post")]
    FeaturePost,
    #[sea_orm(string_value = "unfeature_post")]
    UnfeaturePost,
    #[sea_orm(string_value = "delete_post")]
    DeletePost,
    #[sea_orm(string_value = "delete_comment")]
    DeleteComment,
    #[sea_orm(string_value = "change_role")]
    ChangeRole,
    #[sea_orm(string_value = "change_status")]
    ChangeStatus,
}

/// Kind of object an action targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "user")]
    User,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moderation_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub moderator_id: String,

    pub action: ModerationAction,

    pub target_type: TargetType,

    pub target_id: String,

    /// Free-form context, e.g. the rejection reason or the new role
    #[sea_orm(column_type = "Text", nullable)]
    pub detail: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ModeratorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Moderator,
}

impl ActiveModelBehavior for ActiveModel {}

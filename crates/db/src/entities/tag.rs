//! Tag entity. Aggregates tag usage across approved posts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Normalized name (lowercase, no leading `#`)
    #[sea_orm(unique)]
    pub name: String,

    /// Display color, `#rrggbb`
    pub color: String,

    /// Approved posts carrying this tag
    #[sea_orm(default_value = 0)]
    pub posts_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Post::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Post::Content).text().not_null())
                    .col(ColumnDef::new(Post::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Post::ImageUrl).string_len(2048))
                    .col(ColumnDef::new(Post::Tags).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Post::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Post::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Post::FeaturedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Post::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(Post::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Post::RejectionReason).text())
                    .col(ColumnDef::new(Post::LikesCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::CommentsCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Post::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_user")
                            .from(Post::Table, Post::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reviewer")
                            .from(Post::Table, Post::ReviewedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The review fields follow the status column.
        manager
            .get_connection()
            .execute_unprepared(
                r"ALTER TABLE post ADD CONSTRAINT chk_post_review_fields CHECK (
                    (status = 'pending' AND reviewed_by IS NULL AND reviewed_at IS NULL AND rejection_reason IS NULL)
                    OR (status = 'approved' AND reviewed_at IS NOT NULL AND rejection_reason IS NULL)
                    OR (status = 'rejected' AND reviewed_at IS NOT NULL AND rejection_reason IS NOT NULL)
                )",
            )
            .await?;

        // Index: (status, created_at) for feeds and the moderation queue
        manager
            .create_index(
                Index::create()
                    .name("idx_post_status_created_at")
                    .table(Post::Table)
                    .col(Post::Status)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for profiles and "my posts")
        manager
            .create_index(
                Index::create()
                    .name("idx_post_user_id")
                    .table(Post::Table)
                    .col(Post::UserId)
                    .to_owned(),
            )
            .await?;

        // GIN index for tag containment queries
        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX IF NOT EXISTS idx_post_tags ON post USING GIN (tags)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    UserId,
    Title,
    Content,
    Category,
    ImageUrl,
    Tags,
    Status,
    IsFeatured,
    FeaturedAt,
    ReviewedBy,
    ReviewedAt,
    RejectionReason,
    LikesCount,
    CommentsCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

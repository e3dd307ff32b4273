use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MagicLinkTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MagicLinkTokens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MagicLinkTokens::Email).string().not_null())
                    .col(
                        ColumnDef::new(MagicLinkTokens::TokenHash)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MagicLinkTokens::OtpCode).string().not_null())
                    .col(ColumnDef::new(MagicLinkTokens::Tenant).string().not_null())
                    .col(
                        ColumnDef::new(MagicLinkTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MagicLinkTokens::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(MagicLinkTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // OTP lookup and re-issue both filter on (email, tenant).
        manager
            .create_index(
                Index::create()
                    .table(MagicLinkTokens::Table)
                    .col(MagicLinkTokens::Email)
                    .col(MagicLinkTokens::Tenant)
                    .name("idx_magic_link_tokens_email_tenant")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(MagicLinkTokens::Table)
                    .col(MagicLinkTokens::ExpiresAt)
                    .name("idx_magic_link_tokens_expires_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MagicLinkTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MagicLinkTokens {
    Table,
    Id,
    Email,
    TokenHash,
    OtpCode,
    Tenant,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

use sea_orm_migration::prelude::*;

use crate::TENANTS;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for tenant in TENANTS {
            let table = Alias::new(format!("{tenant}_users"));
            manager
                .create_table(
                    Table::create()
                        .table(table.clone())
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Users::AuthId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::DisplayName).string())
                        .col(ColumnDef::new(Users::AvatarUrl).string())
                        .col(
                            ColumnDef::new(Users::UserType)
                                .string()
                                .not_null()
                                .default("member"),
                        )
                        .col(ColumnDef::new(Users::LastLoginAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for tenant in TENANTS {
            manager
                .drop_table(
                    Table::drop()
                        .table(Alias::new(format!("{tenant}_users")))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Id,
    AuthId,
    Email,
    DisplayName,
    AvatarUrl,
    UserType,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

use crate::TENANTS;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for tenant in TENANTS {
            let table = Alias::new(format!("{tenant}_sessions"));
            let users = Alias::new(format!("{tenant}_users"));
            manager
                .create_table(
                    Table::create()
                        .table(table.clone())
                        .if_not_exists()
                        .col(ColumnDef::new(Sessions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Sessions::UserId).uuid().not_null())
                        .col(ColumnDef::new(Sessions::Token).text().not_null().unique_key())
                        .col(ColumnDef::new(Sessions::UserAgent).string())
                        .col(ColumnDef::new(Sessions::IpAddress).string())
                        .col(
                            ColumnDef::new(Sessions::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Sessions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(table.clone(), Sessions::UserId)
                                .to(users, Sessions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .table(table)
                        .col(Sessions::UserId)
                        .name(format!("idx_{tenant}_sessions_user_id"))
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
                        .table(Alias::new(format!("{tenant}_sessions")))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Sessions {
    Id,
    UserId,
    Token,
    UserAgent,
    IpAddress,
    ExpiresAt,
    CreatedAt,
}

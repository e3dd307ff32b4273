use sea_orm_migration::prelude::*;

use crate::TENANTS;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Rows are visible when the table owner bypasses RLS (the auth service
/// itself) or when `app.current_<tenant>_user_id` names the row's user.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for tenant in TENANTS {
            let var = format!("app.current_{tenant}_user_id");
            db.execute_unprepared(&format!(
                "ALTER TABLE {tenant}_users ENABLE ROW LEVEL SECURITY;
                 CREATE POLICY {tenant}_users_self ON {tenant}_users
                     USING (id::text = current_setting('{var}', true));
                 ALTER TABLE {tenant}_sessions ENABLE ROW LEVEL SECURITY;
                 CREATE POLICY {tenant}_sessions_self ON {tenant}_sessions
                     USING (user_id::text = current_setting('{var}', true));"
            ))
            .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for tenant in TENANTS {
            db.execute_unprepared(&format!(
                "DROP POLICY IF EXISTS {tenant}_sessions_self ON {tenant}_sessions;
                 ALTER TABLE {tenant}_sessions DISABLE ROW LEVEL SECURITY;
                 DROP POLICY IF EXISTS {tenant}_users_self ON {tenant}_users;
                 ALTER TABLE {tenant}_users DISABLE ROW LEVEL SECURITY;"
            ))
            .await?;
        }
        Ok(())
    }
}

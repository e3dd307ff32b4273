use sea_orm_migration::prelude::*;

mod m20260301_000001_create_tenant_users;
mod m20260301_000002_create_magic_link_tokens;
mod m20260301_000003_create_tenant_sessions;
mod m20260301_000004_enable_row_level_security;

/// Tenant-owned tables, one per tenant for users and sessions.
pub(crate) const TENANTS: [&str; 2] = ["weokto", "stam"];

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_tenant_users::Migration),
            Box::new(m20260301_000002_create_magic_link_tokens::Migration),
            Box::new(m20260301_000003_create_tenant_sessions::Migration),
            Box::new(m20260301_000004_enable_row_level_security::Migration),
        ]
    }
}

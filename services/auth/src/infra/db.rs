use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use weokto_auth_schema::magic_link_tokens;
use weokto_domain::tenant::Tenant;

use crate::domain::repository::{MagicLinkRepository, TenantRepository};
use crate::domain::types::{MagicLinkToken, SessionRecord, TenantUser, UserProfile};
use crate::error::AuthServiceError;

// ── MagicLink repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMagicLinkRepository {
    pub db: Arc<DatabaseConnection>,
}

impl MagicLinkRepository for DbMagicLinkRepository {
    async fn delete_unused(&self, email: &str, tenant: Tenant) -> Result<u64, AuthServiceError> {
        let res = magic_link_tokens::Entity::delete_many()
            .filter(magic_link_tokens::Column::Email.eq(email))
            .filter(magic_link_tokens::Column::Tenant.eq(tenant.as_str()))
            .filter(magic_link_tokens::Column::UsedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .context("delete unused magic links")?;
        Ok(res.rows_affected)
    }

    async fn create(&self, token: &MagicLinkToken) -> Result<(), AuthServiceError> {
        magic_link_tokens::ActiveModel {
            id: Set(token.id),
            email: Set(token.email.clone()),
            token_hash: Set(token.token_hash.clone()),
            otp_code: Set(token.otp_code.clone()),
            tenant: Set(token.tenant.as_str().to_owned()),
            expires_at: Set(token.expires_at),
            used_at: Set(token.used_at),
            created_at: Set(token.created_at),
        }
        .insert(self.db.as_ref())
        .await
        .context("create magic link")?;
        Ok(())
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<MagicLinkToken>, AuthServiceError> {
        let model = magic_link_tokens::Entity::find()
            .filter(magic_link_tokens::Column::TokenHash.eq(token_hash))
            .one(self.db.as_ref())
            .await
            .context("find magic link by hash")?;
        model.map(magic_link_from_model).transpose()
    }

    async fn find_latest_unused(
        &self,
        email: &str,
        tenant: Tenant,
    ) -> Result<Option<MagicLinkToken>, AuthServiceError> {
        let model = magic_link_tokens::Entity::find()
            .filter(magic_link_tokens::Column::Email.eq(email))
            .filter(magic_link_tokens::Column::Tenant.eq(tenant.as_str()))
            .filter(magic_link_tokens::Column::UsedAt.is_null())
            .order_by_desc(magic_link_tokens::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .context("find latest unused magic link")?;
        model.map(magic_link_from_model).transpose()
    }

    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, AuthServiceError> {
        let res = magic_link_tokens::Entity::update_many()
            .col_expr(magic_link_tokens::Column::UsedAt, Expr::value(at))
            .filter(magic_link_tokens::Column::Id.eq(id))
            .filter(magic_link_tokens::Column::UsedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .context("consume magic link")?;
        Ok(res.rows_affected == 1)
    }

    async fn delete_stale(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let res = magic_link_tokens::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(magic_link_tokens::Column::ExpiresAt.lte(now))
                    .add(magic_link_tokens::Column::UsedAt.is_not_null()),
            )
            .exec(self.db.as_ref())
            .await
            .context("delete stale magic links")?;
        Ok(res.rows_affected)
    }
}

fn magic_link_from_model(
    model: magic_link_tokens::Model,
) -> Result<MagicLinkToken, AuthServiceError> {
    let tenant = model
        .tenant
        .parse::<Tenant>()
        .with_context(|| format!("magic link {} has unknown tenant", model.id))?;
    Ok(MagicLinkToken {
        id: model.id,
        email: model.email,
        token_hash: model.token_hash,
        otp_code: model.otp_code,
        tenant,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    })
}

// ── Tenant tables ─────────────────────────────────────────────────────────────

/// Query functions for one tenant's `<tenant>_users` / `<tenant>_sessions` pair.
/// Both tenants share the same shape, so the module is generated.
macro_rules! tenant_tables {
    ($module:ident, $users:ident, $sessions:ident) => {
        mod $module {
            use sea_orm::sea_query::Expr;
            use sea_orm::{
                ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr,
                EntityTrait, QueryFilter,
            };

            use weokto_auth_schema::$sessions as sessions;
            use weokto_auth_schema::$users as users;

            use super::*;

            pub async fn find_user_by_email(
                db: &DatabaseConnection,
                email: &str,
            ) -> Result<Option<TenantUser>, DbErr> {
                let model = users::Entity::find()
                    .filter(users::Column::Email.eq(email))
                    .one(db)
                    .await?;
                Ok(model.map(user_from_model))
            }

            pub async fn find_user_by_id(
                db: &DatabaseConnection,
                id: Uuid,
            ) -> Result<Option<TenantUser>, DbErr> {
                Ok(users::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .map(user_from_model))
            }

            pub async fn create_user(db: &DatabaseConnection, user: &TenantUser) -> Result<(), DbErr> {
                users::ActiveModel {
                    id: Set(user.id),
                    auth_id: Set(user.auth_id),
                    email: Set(user.email.clone()),
                    display_name: Set(user.display_name.clone()),
                    avatar_url: Set(user.avatar_url.clone()),
                    user_type: Set(user.user_type.clone()),
                    last_login_at: Set(user.last_login_at),
                    created_at: Set(user.created_at),
                    updated_at: Set(user.updated_at),
                }
                .insert(db)
                .await?;
                Ok(())
            }

            pub async fn touch_last_login(
                db: &DatabaseConnection,
                user_id: Uuid,
                at: DateTime<Utc>,
            ) -> Result<(), DbErr> {
                users::Entity::update_many()
                    .col_expr(users::Column::LastLoginAt, Expr::value(at))
                    .col_expr(users::Column::UpdatedAt, Expr::value(at))
                    .filter(users::Column::Id.eq(user_id))
                    .exec(db)
                    .await?;
                Ok(())
            }

            pub async fn create_session(
                db: &DatabaseConnection,
                session: &SessionRecord,
            ) -> Result<(), DbErr> {
                sessions::ActiveModel {
                    id: Set(session.id),
                    user_id: Set(session.user_id),
                    token: Set(session.token.clone()),
                    user_agent: Set(session.user_agent.clone()),
                    ip_address: Set(session.ip_address.clone()),
                    expires_at: Set(session.expires_at),
                    created_at: Set(session.created_at),
                }
                .insert(db)
                .await?;
                Ok(())
            }

            pub async fn find_session(
                db: &DatabaseConnection,
                id: Uuid,
            ) -> Result<Option<SessionRecord>, DbErr> {
                Ok(sessions::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .map(session_from_model))
            }

            pub async fn delete_session(db: &DatabaseConnection, id: Uuid) -> Result<bool, DbErr> {
                let res = sessions::Entity::delete_by_id(id).exec(db).await?;
                Ok(res.rows_affected > 0)
            }

            pub async fn delete_expired_sessions(
                db: &DatabaseConnection,
                now: DateTime<Utc>,
            ) -> Result<u64, DbErr> {
                let res = sessions::Entity::delete_many()
                    .filter(sessions::Column::ExpiresAt.lte(now))
                    .exec(db)
                    .await?;
                Ok(res.rows_affected)
            }

            /// Runs on a connection already scoped by the RLS helper.
            pub async fn load_profile<C: ConnectionTrait>(
                conn: &C,
                user_id: Uuid,
            ) -> Result<Option<UserProfile>, DbErr> {
                Ok(users::Entity::find_by_id(user_id)
                    .one(conn)
                    .await?
                    .map(|m| UserProfile {
                        user_type: m.user_type,
                        last_login_at: m.last_login_at,
                        created_at: m.created_at,
                    }))
            }

            fn user_from_model(m: users::Model) -> TenantUser {
                TenantUser {
                    id: m.id,
                    auth_id: m.auth_id,
                    email: m.email,
                    display_name: m.display_name,
                    avatar_url: m.avatar_url,
                    user_type: m.user_type,
                    last_login_at: m.last_login_at,
                    created_at: m.created_at,
                    updated_at: m.updated_at,
                }
            }

            fn session_from_model(m: sessions::Model) -> SessionRecord {
                SessionRecord {
                    id: m.id,
                    user_id: m.user_id,
                    token: m.token,
                    user_agent: m.user_agent,
                    ip_address: m.ip_address,
                    expires_at: m.expires_at,
                    created_at: m.created_at,
                }
            }
        }
    };
}

tenant_tables!(weokto_tables, weokto_users, weokto_sessions);
tenant_tables!(stam_tables, stam_users, stam_sessions);

/// Call the same query function on whichever tenant's tables `$tenant` selects.
macro_rules! on_tenant {
    ($tenant:expr, $f:ident($($arg:expr),* $(,)?)) => {
        match $tenant {
            Tenant::Weokto => weokto_tables::$f($($arg),*).await,
            Tenant::Stam => stam_tables::$f($($arg),*).await,
        }
    };
}

/// Load profile fields for `user_id` on a connection scoped by
/// [`weokto_core::rls::with_user_context`].
pub async fn load_profile<C>(
    conn: &C,
    tenant: Tenant,
    user_id: Uuid,
) -> Result<Option<UserProfile>, sea_orm::DbErr>
where
    C: sea_orm::ConnectionTrait,
{
    on_tenant!(tenant, load_profile(conn, user_id))
}

// ── Tenant repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTenantRepository {
    pub db: Arc<DatabaseConnection>,
    pub tenant: Tenant,
}

impl TenantRepository for DbTenantRepository {
    fn tenant(&self) -> Tenant {
        self.tenant
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TenantUser>, AuthServiceError> {
        let user = on_tenant!(self.tenant, find_user_by_email(&self.db, email))
            .with_context(|| format!("find {} user by email", self.tenant))?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<TenantUser>, AuthServiceError> {
        let user = on_tenant!(self.tenant, find_user_by_id(&self.db, id))
            .with_context(|| format!("find {} user by id", self.tenant))?;
        Ok(user)
    }

    async fn create_user(&self, user: &TenantUser) -> Result<(), AuthServiceError> {
        on_tenant!(self.tenant, create_user(&self.db, user))
            .with_context(|| format!("create {} user", self.tenant))?;
        Ok(())
    }

    async fn touch_last_login(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        on_tenant!(self.tenant, touch_last_login(&self.db, user_id, at))
            .with_context(|| format!("touch {} last login", self.tenant))?;
        Ok(())
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<(), AuthServiceError> {
        on_tenant!(self.tenant, create_session(&self.db, session))
            .with_context(|| format!("create {} session", self.tenant))?;
        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<SessionRecord>, AuthServiceError> {
        let session = on_tenant!(self.tenant, find_session(&self.db, id))
            .with_context(|| format!("find {} session", self.tenant))?;
        Ok(session)
    }

    async fn delete_session(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let deleted = on_tenant!(self.tenant, delete_session(&self.db, id))
            .with_context(|| format!("delete {} session", self.tenant))?;
        Ok(deleted)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let removed = on_tenant!(self.tenant, delete_expired_sessions(&self.db, now))
            .with_context(|| format!("delete expired {} sessions", self.tenant))?;
        Ok(removed)
    }
}

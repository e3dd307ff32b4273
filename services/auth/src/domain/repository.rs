#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use weokto_domain::tenant::Tenant;

use crate::domain::types::{MagicLinkToken, SessionRecord, TenantUser};
use crate::error::AuthServiceError;

/// Repository for magic link tokens (shared by all tenants).
pub trait MagicLinkRepository: Send + Sync {
    /// Delete unused tokens for `email` on `tenant`. Returns the number removed.
    async fn delete_unused(&self, email: &str, tenant: Tenant) -> Result<u64, AuthServiceError>;

    async fn create(&self, token: &MagicLinkToken) -> Result<(), AuthServiceError>;

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<MagicLinkToken>, AuthServiceError>;

    /// Most recently created unused token for `email` on `tenant`, expired or not.
    async fn find_latest_unused(
        &self,
        email: &str,
        tenant: Tenant,
    ) -> Result<Option<MagicLinkToken>, AuthServiceError>;

    /// Set `used_at` only if the token is still unused.
    /// Returns `false` when another request redeemed it first.
    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, AuthServiceError>;

    /// Delete tokens that are expired or already used.
    async fn delete_stale(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Users and sessions of a single tenant.
pub trait TenantRepository: Send + Sync {
    fn tenant(&self) -> Tenant;

    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<TenantUser>, AuthServiceError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<TenantUser>, AuthServiceError>;

    async fn create_user(&self, user: &TenantUser) -> Result<(), AuthServiceError>;

    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>)
    -> Result<(), AuthServiceError>;

    async fn create_session(&self, session: &SessionRecord) -> Result<(), AuthServiceError>;

    async fn find_session(&self, id: Uuid) -> Result<Option<SessionRecord>, AuthServiceError>;

    /// Delete a session. Returns `true` if deleted, `false` if not found.
    async fn delete_session(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Outgoing login email.
#[derive(Debug, Clone)]
pub struct MagicLinkEmail {
    pub to: String,
    pub tenant: Tenant,
    pub link: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
}

/// Port for delivering login emails.
pub trait Mailer: Send + Sync {
    async fn send_magic_link(&self, email: &MagicLinkEmail) -> Result<(), AuthServiceError>;
}

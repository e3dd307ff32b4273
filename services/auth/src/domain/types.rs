use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use weokto_domain::tenant::Tenant;

/// Pending passwordless login. Only the hash of the link token is stored.
#[derive(Debug, Clone)]
pub struct MagicLinkToken {
    pub id: Uuid,
    pub email: String,
    pub token_hash: String,
    pub otp_code: String,
    pub tenant: Tenant,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MagicLinkToken {
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

/// Email and tenant proven by a redeemed magic link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedLogin {
    pub email: String,
    pub tenant: Tenant,
}

/// A row of a tenant's user table.
#[derive(Debug, Clone)]
pub struct TenantUser {
    pub id: Uuid,
    pub auth_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub user_type: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to return to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub user_type: String,
}

impl From<&TenantUser> for SessionUser {
    fn from(user: &TenantUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            user_type: user.user_type.clone(),
        }
    }
}

/// A row of a tenant's session table.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Client details recorded on the session row.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Profile fields loaded under the user's RLS context.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_type: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Magic link and OTP time-to-live in seconds.
pub const MAGIC_LINK_TTL_SECS: i64 = 15 * 60;

/// Number of digits in a one-time code.
pub const OTP_LEN: usize = 6;

/// JWT lifetime with "remember me" (30 days).
pub const SESSION_TTL_REMEMBER_SECS: i64 = 60 * 60 * 24 * 30;

/// JWT lifetime without "remember me" (24 hours).
pub const SESSION_TTL_DEFAULT_SECS: i64 = 60 * 60 * 24;

/// Session row lifetime. The JWT expiry is the tighter bound for short sessions.
pub const SESSION_ROW_TTL_SECS: i64 = SESSION_TTL_REMEMBER_SECS;

/// `user_type` given to users created on first login.
pub const DEFAULT_USER_TYPE: &str = "member";

use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use weokto_auth_types::cookie::{
    CookieSettings, clear_session_cookie, session_token, set_session_cookie,
};
use weokto_auth_types::token::{SessionClaims, sign_session_token, validate_session_token};
use weokto_domain::tenant::Tenant;

use crate::domain::repository::TenantRepository;
use crate::domain::types::{
    RequestMeta, SESSION_ROW_TTL_SECS, SESSION_TTL_DEFAULT_SECS, SESSION_TTL_REMEMBER_SECS,
    SessionRecord, SessionUser, TenantUser,
};
use crate::error::AuthServiceError;

/// Everything a tenant's session service needs besides storage.
#[derive(Clone)]
pub struct TenantSettings {
    pub tenant: Tenant,
    pub jwt_secret: String,
    pub cookie: CookieSettings,
    /// Public base URL of the tenant's app, without trailing slash.
    pub app_url: String,
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// A cookie that resolved to a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session_id: Uuid,
    pub user: SessionUser,
}

/// Sign a session JWT. 30-day expiry with `remember_me`, 24 hours otherwise.
pub fn issue_session_token(
    settings: &TenantSettings,
    user_id: Uuid,
    session_id: Uuid,
    issued_at: DateTime<Utc>,
    remember_me: bool,
) -> Result<(String, DateTime<Utc>), AuthServiceError> {
    let ttl = if remember_me {
        SESSION_TTL_REMEMBER_SECS
    } else {
        SESSION_TTL_DEFAULT_SECS
    };
    let expires_at = issued_at + Duration::seconds(ttl);
    let claims = SessionClaims {
        sub: user_id.to_string(),
        sid: session_id.to_string(),
        tenant: settings.tenant,
        iat: issued_at.timestamp().max(0) as u64,
        exp: expires_at.timestamp().max(0) as u64,
    };
    let token = sign_session_token(&claims, &settings.jwt_secret)
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, expires_at))
}

/// Session lifecycle for one tenant: JWT in a cookie, revocable row in the DB.
///
/// A token only counts while its row exists, so deleting the row logs the
/// user out even though the JWT itself is still valid.
pub struct SessionService<R>
where
    R: TenantRepository,
{
    pub repo: R,
    pub settings: TenantSettings,
}

impl<R> SessionService<R>
where
    R: TenantRepository,
{
    pub fn tenant(&self) -> Tenant {
        self.settings.tenant
    }

    pub async fn create_session(
        &self,
        user: &TenantUser,
        meta: &RequestMeta,
        remember_me: bool,
    ) -> Result<IssuedSession, AuthServiceError> {
        let now = Utc::now();
        let session_id = Uuid::new_v4();
        let (token, expires_at) =
            issue_session_token(&self.settings, user.id, session_id, now, remember_me)?;

        self.repo
            .create_session(&SessionRecord {
                id: session_id,
                user_id: user.id,
                token: token.clone(),
                user_agent: meta.user_agent.clone(),
                ip_address: meta.ip_address.clone(),
                expires_at: now + Duration::seconds(SESSION_ROW_TTL_SECS),
                created_at: now,
            })
            .await?;
        self.repo.touch_last_login(user.id, now).await?;

        tracing::info!(
            tenant = %self.tenant(),
            user_id = %user.id,
            session_id = %session_id,
            remember_me,
            "session created"
        );
        Ok(IssuedSession {
            session_id,
            token,
            expires_at,
        })
    }

    /// Resolve the tenant's session cookie to a live session.
    pub async fn get_session(
        &self,
        jar: &CookieJar,
    ) -> Result<Option<ActiveSession>, AuthServiceError> {
        match session_token(jar, &self.settings.cookie) {
            Some(token) => self.session_for_token(&token).await,
            None => Ok(None),
        }
    }

    /// `None` unless the JWT verifies for this tenant, its row still exists
    /// with the same token and user, the row is unexpired, and the user exists.
    pub async fn session_for_token(
        &self,
        token: &str,
    ) -> Result<Option<ActiveSession>, AuthServiceError> {
        let info = match validate_session_token(token, &self.settings.jwt_secret, self.tenant()) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(tenant = %self.tenant(), error = %e, "rejected session token");
                return Ok(None);
            }
        };

        let Some(record) = self.repo.find_session(info.session_id).await? else {
            return Ok(None);
        };
        if record.token != token || record.user_id != info.user_id || record.expires_at <= Utc::now()
        {
            return Ok(None);
        }

        let user = self.repo.find_user_by_id(info.user_id).await?;
        Ok(user.map(|user| ActiveSession {
            session_id: record.id,
            user: SessionUser::from(&user),
        }))
    }

    /// Delete the session row behind the cookie and clear the cookie.
    ///
    /// Storage errors are logged, never returned: logout always clears the cookie.
    pub async fn destroy_session(&self, jar: CookieJar) -> CookieJar {
        if let Some(token) = session_token(&jar, &self.settings.cookie) {
            match validate_session_token(&token, &self.settings.jwt_secret, self.tenant()) {
                Ok(info) => match self.repo.delete_session(info.session_id).await {
                    Ok(deleted) => {
                        tracing::info!(
                            tenant = %self.tenant(),
                            session_id = %info.session_id,
                            deleted,
                            "session destroyed"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(tenant = %self.tenant(), error = ?e, "failed to delete session row");
                    }
                },
                Err(e) => {
                    tracing::debug!(tenant = %self.tenant(), error = %e, "logout with invalid token");
                }
            }
        }
        clear_session_cookie(jar, &self.settings.cookie)
    }

    pub fn set_cookie(&self, jar: CookieJar, token: String) -> CookieJar {
        set_session_cookie(jar, &self.settings.cookie, token)
    }
}

// ── Purge ─────────────────────────────────────────────────────────────────────

pub struct PurgeSessionsUseCase<R>
where
    R: TenantRepository,
{
    pub repo: R,
}

impl<R> PurgeSessionsUseCase<R>
where
    R: TenantRepository,
{
    /// Delete expired session rows. Returns the number removed.
    pub async fn execute(&self) -> Result<u64, AuthServiceError> {
        let removed = self.repo.delete_expired_sessions(Utc::now()).await?;
        tracing::info!(tenant = %self.repo.tenant(), removed, "purged expired sessions");
        Ok(removed)
    }
}

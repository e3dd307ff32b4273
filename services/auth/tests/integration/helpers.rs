use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use weokto_auth::domain::credential::hash_token;
use weokto_auth::domain::repository::{
    MagicLinkEmail, MagicLinkRepository, Mailer, TenantRepository,
};
use weokto_auth::domain::types::{MagicLinkToken, SessionRecord, TenantUser};
use weokto_auth::error::AuthServiceError;
use weokto_auth::usecase::session::{SessionService, TenantSettings};
use weokto_auth_types::cookie::CookieSettings;
use weokto_domain::tenant::Tenant;

pub const WEOKTO_SECRET: &str = "weokto-test-secret-key-0123456789abcdef";
pub const STAM_SECRET: &str = "stam-test-secret-key-0123456789abcdef";

pub fn test_settings(tenant: Tenant) -> TenantSettings {
    let (secret, app_url) = match tenant {
        Tenant::Weokto => (WEOKTO_SECRET, "https://weokto.com"),
        Tenant::Stam => (STAM_SECRET, "https://be-stam.com"),
    };
    TenantSettings {
        tenant,
        jwt_secret: secret.to_owned(),
        cookie: CookieSettings::for_tenant(tenant, None, false),
        app_url: app_url.to_owned(),
    }
}

pub fn test_user(email: &str) -> TenantUser {
    let now = Utc::now();
    TenantUser {
        id: Uuid::new_v4(),
        auth_id: Uuid::new_v4(),
        email: email.to_owned(),
        display_name: None,
        avatar_url: None,
        user_type: "member".to_owned(),
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Token row for `raw`, created `age_secs` ago and expiring `expires_in_secs` from now.
pub fn test_token(
    raw: &str,
    email: &str,
    otp: &str,
    tenant: Tenant,
    age_secs: i64,
    expires_in_secs: i64,
) -> MagicLinkToken {
    let now = Utc::now();
    MagicLinkToken {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        token_hash: hash_token(raw),
        otp_code: otp.to_owned(),
        tenant,
        expires_at: now + Duration::seconds(expires_in_secs),
        used_at: None,
        created_at: now - Duration::seconds(age_secs),
    }
}

// ── MockMagicLinkRepo ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMagicLinkRepo {
    pub tokens: Arc<Mutex<Vec<MagicLinkToken>>>,
}

impl MockMagicLinkRepo {
    pub fn new(tokens: Vec<MagicLinkToken>) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
        }
    }

    pub fn snapshot(&self) -> Vec<MagicLinkToken> {
        self.tokens.lock().unwrap().clone()
    }
}

impl MagicLinkRepository for MockMagicLinkRepo {
    async fn delete_unused(&self, email: &str, tenant: Tenant) -> Result<u64, AuthServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| !(t.email == email && t.tenant == tenant && t.used_at.is_none()));
        Ok((before - tokens.len()) as u64)
    }

    async fn create(&self, token: &MagicLinkToken) -> Result<(), AuthServiceError> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<MagicLinkToken>, AuthServiceError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn find_latest_unused(
        &self,
        email: &str,
        tenant: Tenant,
    ) -> Result<Option<MagicLinkToken>, AuthServiceError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.email == email && t.tenant == tenant && t.used_at.is_none())
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, AuthServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id && t.used_at.is_none()) {
            Some(token) => {
                token.used_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_stale(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.expires_at > now && t.used_at.is_none());
        Ok((before - tokens.len()) as u64)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<MagicLinkEmail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<MagicLinkEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for MockMailer {
    async fn send_magic_link(&self, email: &MagicLinkEmail) -> Result<(), AuthServiceError> {
        if self.fail {
            return Err(AuthServiceError::EmailDelivery(anyhow::anyhow!(
                "provider unavailable"
            )));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ── MockTenantRepo ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockTenantRepo {
    pub tenant: Tenant,
    pub users: Arc<Mutex<Vec<TenantUser>>>,
    pub sessions: Arc<Mutex<Vec<SessionRecord>>>,
    pub fail_deletes: bool,
}

impl MockTenantRepo {
    pub fn new(tenant: Tenant, users: Vec<TenantUser>) -> Self {
        Self {
            tenant,
            users: Arc::new(Mutex::new(users)),
            sessions: Arc::new(Mutex::new(vec![])),
            fail_deletes: false,
        }
    }

    pub fn empty(tenant: Tenant) -> Self {
        Self::new(tenant, vec![])
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<TenantUser> {
        self.users.lock().unwrap().clone()
    }
}

impl TenantRepository for MockTenantRepo {
    fn tenant(&self) -> Tenant {
        self.tenant
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TenantUser>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<TenantUser>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create_user(&self, user: &TenantUser) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthServiceError::Internal(anyhow::anyhow!(
                "duplicate email"
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn touch_last_login(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user_id)
        {
            user.last_login_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<(), AuthServiceError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<SessionRecord>, AuthServiceError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn delete_session(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        if self.fail_deletes {
            return Err(AuthServiceError::Internal(anyhow::anyhow!(
                "connection reset"
            )));
        }
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        Ok(sessions.len() < before)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

pub fn session_service(repo: MockTenantRepo) -> SessionService<MockTenantRepo> {
    let settings = test_settings(repo.tenant);
    SessionService { repo, settings }
}

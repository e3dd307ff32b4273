use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use weokto_domain::tenant::Tenant;

use crate::domain::credential::{generate_otp, generate_token, hash_token, normalize_email};
use crate::domain::repository::{MagicLinkEmail, MagicLinkRepository, Mailer};
use crate::domain::types::{MAGIC_LINK_TTL_SECS, MagicLinkToken, OTP_LEN, VerifiedLogin};
use crate::error::AuthServiceError;

/// Verification URL embedded in the email.
///
/// `<app_url>/api/<tenant>/auth/magic-link/verify?token=<raw>`
pub fn magic_link_url(
    app_url: &str,
    tenant: Tenant,
    raw_token: &str,
) -> Result<url::Url, AuthServiceError> {
    let mut url = url::Url::parse(app_url)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("invalid app url {app_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| AuthServiceError::Internal(anyhow::anyhow!("app url cannot be a base")))?
        .pop_if_empty()
        .extend(["api", tenant.as_str(), "auth", "magic-link", "verify"]);
    url.query_pairs_mut().append_pair("token", raw_token);
    Ok(url)
}

// ── Issue ─────────────────────────────────────────────────────────────────────

pub struct IssueMagicLinkInput {
    pub email: String,
    pub tenant: Tenant,
}

/// What was sent. The raw token and OTP are returned for the caller's
/// bookkeeping and must not be echoed to the client.
#[derive(Debug)]
pub struct IssuedMagicLink {
    pub raw_token: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
}

pub struct IssueMagicLinkUseCase<M, E>
where
    M: MagicLinkRepository,
    E: Mailer,
{
    pub tokens: M,
    pub mailer: E,
    /// Public base URL of the tenant's app.
    pub app_url: String,
}

impl<M, E> IssueMagicLinkUseCase<M, E>
where
    M: MagicLinkRepository,
    E: Mailer,
{
    pub async fn execute(
        &self,
        input: IssueMagicLinkInput,
    ) -> Result<IssuedMagicLink, AuthServiceError> {
        let email = normalize_email(&input.email);

        // 1. Only the newest link is live
        let removed = self.tokens.delete_unused(&email, input.tenant).await?;
        if removed > 0 {
            tracing::debug!(tenant = %input.tenant, removed, "replaced pending magic links");
        }

        // 2. Persist the hash before anything leaves the process
        let raw_token = generate_token();
        let otp_code = generate_otp(OTP_LEN);
        let now = Utc::now();
        let token = MagicLinkToken {
            id: Uuid::new_v4(),
            email: email.clone(),
            token_hash: hash_token(&raw_token),
            otp_code: otp_code.clone(),
            tenant: input.tenant,
            expires_at: now + Duration::seconds(MAGIC_LINK_TTL_SECS),
            used_at: None,
            created_at: now,
        };
        self.tokens.create(&token).await?;

        // 3. Send link + code
        let link = magic_link_url(&self.app_url, input.tenant, &raw_token)?;
        self.mailer
            .send_magic_link(&MagicLinkEmail {
                to: email,
                tenant: input.tenant,
                link: link.into(),
                otp_code: otp_code.clone(),
                expires_at: token.expires_at,
            })
            .await?;

        tracing::info!(tenant = %input.tenant, token_id = %token.id, "magic link issued");
        Ok(IssuedMagicLink {
            raw_token,
            otp_code,
            expires_at: token.expires_at,
        })
    }
}

// ── Verify link ───────────────────────────────────────────────────────────────

pub struct VerifyMagicLinkUseCase<M>
where
    M: MagicLinkRepository,
{
    pub tokens: M,
}

impl<M> VerifyMagicLinkUseCase<M>
where
    M: MagicLinkRepository,
{
    /// Redeem a raw link token. `None` for unknown, used, or expired tokens.
    pub async fn execute(&self, raw_token: &str) -> Result<Option<VerifiedLogin>, AuthServiceError> {
        let Some(token) = self.tokens.find_by_hash(&hash_token(raw_token)).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if !token.is_redeemable_at(now) {
            tracing::debug!(token_id = %token.id, "magic link used or expired");
            return Ok(None);
        }
        if !self.tokens.consume(token.id, now).await? {
            tracing::debug!(token_id = %token.id, "magic link redeemed concurrently");
            return Ok(None);
        }

        Ok(Some(VerifiedLogin {
            email: token.email,
            tenant: token.tenant,
        }))
    }
}

// ── Verify OTP ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub otp_code: String,
    pub tenant: Tenant,
}

pub struct VerifyOtpUseCase<M>
where
    M: MagicLinkRepository,
{
    pub tokens: M,
}

impl<M> VerifyOtpUseCase<M>
where
    M: MagicLinkRepository,
{
    /// Redeem the code of the most recent pending token for the address.
    ///
    /// Older tokens are never consulted, so a mismatch fails even if an
    /// earlier code would have matched.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<bool, AuthServiceError> {
        let email = normalize_email(&input.email);
        let Some(token) = self
            .tokens
            .find_latest_unused(&email, input.tenant)
            .await?
        else {
            return Ok(false);
        };

        let now = Utc::now();
        if !token.is_redeemable_at(now) || token.otp_code != input.otp_code.trim() {
            return Ok(false);
        }

        self.tokens.consume(token.id, now).await
    }
}

// ── Purge ─────────────────────────────────────────────────────────────────────

pub struct PurgeMagicLinksUseCase<M>
where
    M: MagicLinkRepository,
{
    pub tokens: M,
}

impl<M> PurgeMagicLinksUseCase<M>
where
    M: MagicLinkRepository,
{
    /// Delete expired and used tokens. Returns the number removed.
    pub async fn execute(&self) -> Result<u64, AuthServiceError> {
        let removed = self.tokens.delete_stale(Utc::now()).await?;
        tracing::info!(removed, "purged magic link tokens");
        Ok(removed)
    }
}

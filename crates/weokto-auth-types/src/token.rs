//! Session JWT signing and validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

use weokto_domain::tenant::Tenant;

/// Identity extracted from a validated session token.
///
/// The token alone is not proof of a live session: callers must still check
/// the session row identified by `session_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokenInfo {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub tenant: Tenant,
    pub expires_at: u64,
}

/// Errors returned by [`validate_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token issued for another tenant")]
    WrongTenant,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims carried by a session token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (UUID string) |
/// | `sid` | custom | session row id (UUID string) |
/// | `tenant` | custom | issuing tenant |
/// | `iat` | `iat` | issue time, seconds since epoch |
/// | `exp` | `exp` | expiry, seconds since epoch |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** feature; only the
/// auth service issues session tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct SessionClaims {
    pub sub: String,
    pub sid: String,
    pub tenant: Tenant,
    pub iat: u64,
    pub exp: u64,
}

/// HS256, `exp` checked with the default 60s leeway, `exp` + `sub` required.
fn decode_jwt(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a session cookie value for `tenant`, signed with that tenant's secret.
pub fn validate_session_token(
    token: &str,
    secret: &str,
    tenant: Tenant,
) -> Result<SessionTokenInfo, TokenError> {
    let claims = decode_jwt(token, secret)?;
    if claims.tenant != tenant {
        return Err(TokenError::WrongTenant);
    }
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    let session_id = claims
        .sid
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(SessionTokenInfo {
        user_id,
        session_id,
        tenant: claims.tenant,
        expires_at: claims.exp,
    })
}

/// Sign session claims with the tenant secret.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn sign_session_token(
    claims: &SessionClaims,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

use axum::http::{HeaderMap, header};

use weokto_domain::tenant::Tenant;

use crate::domain::types::RequestMeta;
use crate::error::AuthServiceError;

pub mod magic_link;
pub mod pages;
pub mod session;

/// Parse the `{tenant}` path segment; unknown tenants are a 404.
pub(crate) fn parse_tenant(raw: &str) -> Result<Tenant, AuthServiceError> {
    raw.parse().map_err(|_| AuthServiceError::UnknownTenant)
}

/// User agent and client IP (first `X-Forwarded-For` hop, else `X-Real-IP`).
pub(crate) fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let ip_address = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_owned);

    RequestMeta {
        user_agent: header_str(headers, header::USER_AGENT.as_str()).map(str::to_owned),
        ip_address,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

//! Per-tenant session cookie builders.
//!
//! Every tenant gets its own cookie name so a browser holding sessions for
//! both products never mixes them up. Attributes: HTTP-only, `SameSite=Lax`,
//! path `/`, Max-Age 30 days, `Secure` in production.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use weokto_domain::tenant::Tenant;

/// Cookie name for WEOKTO sessions.
pub const WEOKTO_SESSION_COOKIE: &str = "weokto_session";

/// Cookie name for STAM sessions.
pub const STAM_SESSION_COOKIE: &str = "stam_session";

/// Cookie Max-Age in seconds (30 days).
pub const SESSION_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 30;

pub fn session_cookie_name(tenant: Tenant) -> &'static str {
    match tenant {
        Tenant::Weokto => WEOKTO_SESSION_COOKIE,
        Tenant::Stam => STAM_SESSION_COOKIE,
    }
}

/// Cookie attributes for one tenant.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: &'static str,
    pub domain: Option<String>,
    pub secure: bool,
}

impl CookieSettings {
    pub fn for_tenant(tenant: Tenant, domain: Option<String>, secure: bool) -> Self {
        Self {
            name: session_cookie_name(tenant),
            domain,
            secure,
        }
    }
}

fn build(settings: &CookieSettings, value: String, max_age: Duration) -> Cookie<'static> {
    let mut builder = Cookie::build((settings.name, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use weokto_auth_types::cookie::{set_session_cookie, CookieSettings};
/// use weokto_domain::tenant::Tenant;
///
/// let settings = CookieSettings::for_tenant(Tenant::Stam, Some("be-stam.com".to_string()), true);
/// let jar = set_session_cookie(CookieJar::new(), &settings, "jwt".to_string());
/// let cookie = jar.get("stam_session").unwrap();
/// assert_eq!(cookie.value(), "jwt");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("be-stam.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, settings: &CookieSettings, value: String) -> CookieJar {
    jar.add(build(
        settings,
        value,
        Duration::seconds(SESSION_COOKIE_MAX_AGE),
    ))
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use weokto_auth_types::cookie::{clear_session_cookie, set_session_cookie, CookieSettings};
/// use weokto_domain::tenant::Tenant;
///
/// let settings = CookieSettings::for_tenant(Tenant::Weokto, None, false);
/// let jar = set_session_cookie(CookieJar::new(), &settings, "jwt".to_string());
/// let jar = clear_session_cookie(jar, &settings);
/// let cookie = jar.get("weokto_session").unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.domain(), None);
/// ```
pub fn clear_session_cookie(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(build(settings, String::new(), Duration::ZERO))
}

/// Read the raw session token for this tenant, if the cookie is present and non-empty.
pub fn session_token(jar: &CookieJar, settings: &CookieSettings) -> Option<String> {
    jar.get(settings.name)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

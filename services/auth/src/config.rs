use weokto_auth_types::cookie::CookieSettings;
use weokto_domain::host::HostResolver;
use weokto_domain::tenant::Tenant;

use crate::infra::email::DEFAULT_EMAIL_API_URL;
use crate::usecase::session::TenantSettings;

/// Minimum accepted length of a tenant JWT secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Per-tenant part of [`AuthConfig`].
pub struct TenantConfig {
    /// HMAC secret for this tenant's session tokens. Env var: `<TENANT>_JWT_SECRET`.
    pub jwt_secret: String,
    /// Cookie domain attribute; host-only when unset. Env var: `<TENANT>_COOKIE_DOMAIN`.
    pub cookie_domain: Option<String>,
    /// Public app URL. Env var: `<TENANT>_APP_URL`, falls back to `APP_BASE_URL`.
    pub app_url: String,
    /// Hosts served as this tenant. Env var: `<TENANT>_DOMAINS` (comma separated).
    pub domains: Vec<String>,
}

/// Auth service configuration loaded from environment variables.
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3000). Env var: `PORT`.
    pub port: u16,
    /// `APP_ENV=production` turns on `Secure` cookies.
    pub production: bool,
    pub weokto: TenantConfig,
    pub stam: TenantConfig,
    /// Tenant for hosts matching neither list. Env var: `DEFAULT_TENANT`.
    pub default_tenant: Tenant,
    /// Email provider key; delivery is disabled when unset.
    pub email_api_key: Option<String>,
    pub email_api_url: String,
    pub email_from: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Panics on missing or invalid required values.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let base_url = non_empty("APP_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let tenant_config = |tenant: Tenant| {
            let upper = tenant.as_str().to_uppercase();
            let secret_key = format!("{upper}_JWT_SECRET");
            let jwt_secret = non_empty(&secret_key).unwrap_or_else(|| panic!("{secret_key}"));
            assert!(
                jwt_secret.len() >= MIN_JWT_SECRET_LEN,
                "{secret_key} must be at least {MIN_JWT_SECRET_LEN} bytes"
            );
            TenantConfig {
                jwt_secret,
                cookie_domain: non_empty(&format!("{upper}_COOKIE_DOMAIN")),
                app_url: non_empty(&format!("{upper}_APP_URL"))
                    .unwrap_or_else(|| base_url.clone())
                    .trim_end_matches('/')
                    .to_owned(),
                domains: non_empty(&format!("{upper}_DOMAINS"))
                    .map(|v| split_list(&v))
                    .unwrap_or_else(|| vec![tenant.default_domain().to_owned()]),
            }
        };

        Self {
            database_url: non_empty("DATABASE_URL").expect("DATABASE_URL"),
            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            production: non_empty("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
            weokto: tenant_config(Tenant::Weokto),
            stam: tenant_config(Tenant::Stam),
            default_tenant: non_empty("DEFAULT_TENANT")
                .map(|v| parse_default_tenant(&v))
                .unwrap_or(Tenant::Weokto),
            email_api_key: non_empty("EMAIL_API_KEY"),
            email_api_url: non_empty("EMAIL_API_URL")
                .unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_owned()),
            email_from: non_empty("EMAIL_FROM").unwrap_or_else(|| "no-reply@weokto.com".to_owned()),
        }
    }

    pub fn tenant(&self, tenant: Tenant) -> &TenantConfig {
        match tenant {
            Tenant::Weokto => &self.weokto,
            Tenant::Stam => &self.stam,
        }
    }

    pub fn host_resolver(&self) -> HostResolver {
        HostResolver::new(&self.stam.domains, &self.weokto.domains, self.default_tenant)
    }

    pub fn tenant_settings(&self, tenant: Tenant) -> TenantSettings {
        let config = self.tenant(tenant);
        TenantSettings {
            tenant,
            jwt_secret: config.jwt_secret.clone(),
            cookie: CookieSettings::for_tenant(tenant, config.cookie_domain.clone(), self.production),
            app_url: config.app_url.clone(),
        }
    }
}

fn parse_default_tenant(value: &str) -> Tenant {
    value.parse().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid DEFAULT_TENANT, using weokto");
        Tenant::Weokto
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

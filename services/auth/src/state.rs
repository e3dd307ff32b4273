use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use weokto_domain::host::HostResolver;
use weokto_domain::tenant::Tenant;

use crate::infra::db::{DbMagicLinkRepository, DbTenantRepository};
use crate::infra::email::EmailClient;
use crate::usecase::session::{SessionService, TenantSettings};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub mailer: EmailClient,
    pub resolver: Arc<HostResolver>,
    pub weokto: Arc<TenantSettings>,
    pub stam: Arc<TenantSettings>,
}

impl AppState {
    pub fn settings(&self, tenant: Tenant) -> &TenantSettings {
        match tenant {
            Tenant::Weokto => &self.weokto,
            Tenant::Stam => &self.stam,
        }
    }

    pub fn magic_link_repo(&self) -> DbMagicLinkRepository {
        DbMagicLinkRepository {
            db: self.db.clone(),
        }
    }

    pub fn tenant_repo(&self, tenant: Tenant) -> DbTenantRepository {
        DbTenantRepository {
            db: self.db.clone(),
            tenant,
        }
    }

    pub fn session_service(&self, tenant: Tenant) -> SessionService<DbTenantRepository> {
        SessionService {
            repo: self.tenant_repo(tenant),
            settings: self.settings(tenant).clone(),
        }
    }
}

impl FromRef<AppState> for Arc<DatabaseConnection> {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

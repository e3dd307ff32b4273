use std::sync::Arc;

use clap::{Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use weokto_auth::config::AuthConfig;
use weokto_auth::infra::db::{DbMagicLinkRepository, DbTenantRepository};
use weokto_auth::infra::email::{EmailClient, HttpMailer};
use weokto_auth::router::build_router;
use weokto_auth::state::AppState;
use weokto_auth::usecase::magic_link::PurgeMagicLinksUseCase;
use weokto_auth::usecase::session::PurgeSessionsUseCase;
use weokto_core::tracing::init_tracing;
use weokto_domain::tenant::Tenant;

#[derive(Parser)]
#[command(name = "weokto", about = "WEOKTO / STAM authentication service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Delete expired or used magic links and expired sessions, then exit.
    Purge,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let config = AuthConfig::from_env();

    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("failed to connect to database"),
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db).await,
        Command::Purge => purge(db).await,
    }
}

async fn serve(config: AuthConfig, db: Arc<DatabaseConnection>) {
    let mailer = match &config.email_api_key {
        Some(key) => EmailClient::Http(
            HttpMailer::new(
                config.email_api_url.clone(),
                key.clone(),
                config.email_from.clone(),
            )
            .expect("failed to build email client"),
        ),
        None => {
            tracing::warn!("EMAIL_API_KEY not set, magic link emails will not be sent");
            EmailClient::Disabled
        }
    };

    let state = AppState {
        db,
        mailer,
        resolver: Arc::new(config.host_resolver()),
        weokto: Arc::new(config.tenant_settings(Tenant::Weokto)),
        stam: Arc::new(config.tenant_settings(Tenant::Stam)),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(
        weokto_domains = ?config.weokto.domains,
        stam_domains = ?config.stam.domains,
        default_tenant = %config.default_tenant,
        "auth service listening on {addr}"
    );
    axum::serve(listener, router).await.expect("server error");
}

async fn purge(db: Arc<DatabaseConnection>) {
    let links = PurgeMagicLinksUseCase {
        tokens: DbMagicLinkRepository { db: db.clone() },
    }
    .execute()
    .await
    .expect("failed to purge magic links");

    let mut sessions = 0;
    for tenant in Tenant::ALL {
        sessions += PurgeSessionsUseCase {
            repo: DbTenantRepository {
                db: db.clone(),
                tenant,
            },
        }
        .execute()
        .await
        .expect("failed to purge sessions");
    }

    info!(magic_links = links, sessions, "purge complete");
}

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use weokto_core::health::{healthz, readyz};
use weokto_core::middleware::{
    propagate_request_id_layer, request_id_layer, with_tenant_rewrite,
};

use crate::handlers::{
    magic_link::{send_magic_link, verify_link, verify_otp},
    pages::{dashboard, home, login},
    session::{current_session, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let resolver = state.resolver.clone();
    let routes = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Magic link
        .route("/api/{tenant}/auth/magic-link/send", post(send_magic_link))
        .route("/api/{tenant}/auth/magic-link/verify-otp", post(verify_otp))
        .route("/api/{tenant}/auth/magic-link/verify", get(verify_link))
        // Session
        .route("/api/{tenant}/auth/logout", post(logout))
        .route("/api/{tenant}/auth/session", get(current_session))
        // Pages (reached through the host rewrite)
        .route("/{tenant}", get(home))
        .route("/{tenant}/login", get(login))
        .route("/{tenant}/dashboard", get(dashboard))
        .with_state(state);

    with_tenant_rewrite(routes, resolver)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}

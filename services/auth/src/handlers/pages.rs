//! Tenant page routes. Hosts reach these through the path rewrite, so
//! `be-stam.com/dashboard` lands on `/stam/dashboard`.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::error::AuthServiceError;
use crate::handlers::parse_tenant;
use crate::state::AppState;

/// GET /{tenant}
pub async fn home(Path(tenant): Path<String>) -> Result<Json<serde_json::Value>, AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    Ok(Json(json!({ "tenant": tenant, "page": "home" })))
}

/// GET /{tenant}/login
pub async fn login(Path(tenant): Path<String>) -> Result<Json<serde_json::Value>, AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    Ok(Json(json!({
        "tenant": tenant,
        "page": "login",
        "send_url": format!("/api/{tenant}/auth/magic-link/send"),
        "verify_otp_url": format!("/api/{tenant}/auth/magic-link/verify-otp"),
    })))
}

/// GET /{tenant}/dashboard
///
/// Protected: without a live session the browser is sent to the tenant's login page.
pub async fn dashboard(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    jar: CookieJar,
) -> Result<Response, AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    match state.session_service(tenant).get_session(&jar).await? {
        Some(session) => Ok(Json(json!({
            "tenant": tenant,
            "page": "dashboard",
            "user": session.user,
        }))
        .into_response()),
        None => {
            let login = format!("{}/login", state.settings(tenant).app_url);
            Ok(Redirect::to(&login).into_response())
        }
    }
}

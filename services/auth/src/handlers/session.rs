use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use uuid::Uuid;

use weokto_core::rls::with_user_context;

use crate::domain::types::{SessionUser, UserProfile};
use crate::error::AuthServiceError;
use crate::handlers::parse_tenant;
use crate::infra::db::load_profile;
use crate::state::AppState;

/// POST /api/{tenant}/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    let jar = state.session_service(tenant).destroy_session(jar).await;
    Ok((StatusCode::NO_CONTENT, jar))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub user: SessionUser,
    pub profile: Option<UserProfile>,
}

/// GET /api/{tenant}/auth/session
///
/// The profile is read under the user's RLS context.
pub async fn current_session(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    let session = state
        .session_service(tenant)
        .get_session(&jar)
        .await?
        .ok_or(AuthServiceError::Unauthenticated)?;

    let user_id = session.user.id;
    let profile = with_user_context::<_, _, AuthServiceError>(&state.db, tenant, user_id, |txn| {
        Box::pin(async move { Ok(load_profile(txn, tenant, user_id).await?) })
    })
    .await?;

    Ok(Json(SessionResponse {
        session_id: session.session_id,
        user: session.user,
        profile,
    }))
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::types::{OTP_LEN, SessionUser};
use crate::error::AuthServiceError;
use crate::handlers::{parse_tenant, request_meta};
use crate::state::AppState;
use crate::usecase::magic_link::{
    IssueMagicLinkInput, IssueMagicLinkUseCase, VerifyMagicLinkUseCase, VerifyOtpInput,
    VerifyOtpUseCase,
};
use crate::usecase::sign_in::{SignInInput, SignInUseCase};

// ── POST /api/{tenant}/auth/magic-link/send ──────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SendMagicLinkRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
}

#[derive(Serialize)]
pub struct SendMagicLinkResponse {
    pub expires_at: DateTime<Utc>,
}

pub async fn send_magic_link(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Json(body): Json<SendMagicLinkRequest>,
) -> Result<(StatusCode, Json<SendMagicLinkResponse>), AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    body.validate()?;

    let usecase = IssueMagicLinkUseCase {
        tokens: state.magic_link_repo(),
        mailer: state.mailer.clone(),
        app_url: state.settings(tenant).app_url.clone(),
    };
    let issued = usecase
        .execute(IssueMagicLinkInput {
            email: body.email,
            tenant,
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendMagicLinkResponse {
            expires_at: issued.expires_at,
        }),
    ))
}

// ── POST /api/{tenant}/auth/magic-link/verify-otp ────────────────────────────

#[derive(Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(equal = 6, message = "code must be 6 digits"))]
    pub otp: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl VerifyOtpRequest {
    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.otp.len() == OTP_LEN && !self.otp.bytes().all(|b| b.is_ascii_digit()) {
            let mut err = ValidationError::new("digits");
            err.message = Some("code must be 6 digits".into());
            errors.add("otp", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub redirect_to: String,
    pub user: SessionUser,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<VerifyOtpResponse>), AuthServiceError> {
    let tenant = parse_tenant(&tenant)?;
    body.check()?;

    let verified = VerifyOtpUseCase {
        tokens: state.magic_link_repo(),
    }
    .execute(VerifyOtpInput {
        email: body.email.clone(),
        otp_code: body.otp,
        tenant,
    })
    .await?;
    if !verified {
        return Err(AuthServiceError::InvalidCredentials);
    }

    let sessions = state.session_service(tenant);
    let usecase = SignInUseCase { sessions };
    let out = usecase
        .execute(SignInInput {
            email: body.email,
            meta: request_meta(&headers),
            remember_me: body.remember_me,
        })
        .await?;

    let jar = usecase.sessions.set_cookie(jar, out.session.token.clone());
    Ok((
        jar,
        Json(VerifyOtpResponse {
            token: out.session.token,
            redirect_to: "/dashboard".to_owned(),
            user: out.user,
        }),
    ))
}

// ── GET /api/{tenant}/auth/magic-link/verify?token= ──────────────────────────

#[derive(Deserialize)]
pub struct VerifyLinkQuery {
    pub token: Option<String>,
}

/// Redeem a link from the email and land on the dashboard.
///
/// Every outcome is a redirect; failures land on the login page with an
/// `error` query parameter.
pub async fn verify_link(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(query): Query<VerifyLinkQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, AuthServiceError> {
    let path_tenant = parse_tenant(&tenant)?;
    let login_url = |error: &str| {
        format!(
            "{}/login?error={error}",
            state.settings(path_tenant).app_url
        )
    };

    let Some(raw_token) = query.token.filter(|t| !t.is_empty()) else {
        return Ok(Redirect::to(&login_url("missing_token")).into_response());
    };

    let verified = VerifyMagicLinkUseCase {
        tokens: state.magic_link_repo(),
    }
    .execute(&raw_token)
    .await;
    let login = match verified {
        Ok(Some(login)) => login,
        Ok(None) => return Ok(Redirect::to(&login_url("invalid_token")).into_response()),
        Err(e) => {
            tracing::error!(error = ?e, tenant = %path_tenant, "magic link verification failed");
            return Ok(Redirect::to(&login_url("server_error")).into_response());
        }
    };

    // The token's own tenant decides which user table and cookie to use.
    if login.tenant != path_tenant {
        tracing::warn!(
            path_tenant = %path_tenant,
            token_tenant = %login.tenant,
            "magic link opened under another tenant"
        );
    }

    let usecase = SignInUseCase {
        sessions: state.session_service(login.tenant),
    };
    let signed_in = usecase
        .execute(SignInInput {
            email: login.email,
            meta: request_meta(&headers),
            remember_me: true,
        })
        .await;
    match signed_in {
        Ok(out) => {
            let jar = usecase.sessions.set_cookie(jar, out.session.token);
            let dashboard = format!("{}/dashboard", usecase.sessions.settings.app_url);
            Ok((jar, Redirect::to(&dashboard)).into_response())
        }
        Err(e) => {
            tracing::error!(error = ?e, tenant = %login.tenant, "sign-in after magic link failed");
            Ok(Redirect::to(&login_url("server_error")).into_response())
        }
    }
}

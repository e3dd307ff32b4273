use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid request")]
    Validation(#[from] validator::ValidationErrors),
    #[error("unknown tenant")]
    UnknownTenant,
    #[error("invalid or expired code")]
    InvalidCredentials,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("email delivery failed")]
    EmailDelivery(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<sea_orm::DbErr> for AuthServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(err.into())
    }
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::UnknownTenant => "UNKNOWN_TENANT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::EmailDelivery(_) => "EMAIL_DELIVERY",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownTenant => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::EmailDelivery(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer records every request; only server-side failures need the error chain.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::EmailDelivery(e) => {
                tracing::error!(error = ?e, kind = "EMAIL_DELIVERY", "email delivery failed")
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(errors) = &self {
            body["fields"] = serde_json::to_value(errors.field_errors()).unwrap_or_default();
        }
        (status, axum::Json(body)).into_response()
    }
}

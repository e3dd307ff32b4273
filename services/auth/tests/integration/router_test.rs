use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use tower::ServiceExt;
use uuid::Uuid;

use weokto_auth::infra::email::EmailClient;
use weokto_auth::router::build_router;
use weokto_auth::state::AppState;
use weokto_auth_schema::magic_link_tokens;
use weokto_domain::host::HostResolver;
use weokto_domain::tenant::Tenant;

use crate::helpers::test_settings;

fn app_with(db: DatabaseConnection) -> Router {
    build_router(AppState {
        db: Arc::new(db),
        mailer: EmailClient::Disabled,
        resolver: Arc::new(HostResolver::new(
            ["be-stam.com"],
            ["weokto.com"],
            Tenant::Weokto,
        )),
        weokto: Arc::new(test_settings(Tenant::Weokto)),
        stam: Arc::new(test_settings(Tenant::Stam)),
    })
}

fn app() -> Router {
    app_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

fn get(host: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap()
}

fn post_json(host: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, host)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// ── Probes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_healthz_on_any_host() {
    let resp = app().oneshot(get("be-stam.com", "/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_attach_request_id() {
    let resp = app().oneshot(get("weokto.com", "/healthz")).await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

// ── Pages ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_rewrite_root_to_stam_home() {
    let resp = app().oneshot(get("app.be-stam.com", "/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["tenant"], "stam");
    assert_eq!(json["page"], "home");
}

#[tokio::test]
async fn should_rewrite_login_for_default_tenant() {
    let resp = app().oneshot(get("localhost:3000", "/login")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["tenant"], "weokto");
    assert_eq!(json["send_url"], "/api/weokto/auth/magic-link/send");
}

#[tokio::test]
async fn should_redirect_dashboard_to_login_without_session() {
    let resp = app()
        .oneshot(get("be-stam.com", "/dashboard"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "https://be-stam.com/login");
}

// ── Session API ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_404_for_unknown_tenant() {
    let resp = app()
        .oneshot(get("weokto.com", "/api/acme/auth/session"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["kind"], "UNKNOWN_TENANT");
}

#[tokio::test]
async fn should_return_401_without_cookie() {
    let resp = app()
        .oneshot(get("be-stam.com", "/api/stam/auth/session"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_clear_cookie_on_logout() {
    let resp = app()
        .oneshot(post_json(
            "be-stam.com",
            "/api/stam/auth/logout",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("stam_session="), "{set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"), "{set_cookie}");
    assert!(set_cookie.contains("HttpOnly"), "{set_cookie}");
}

// ── Magic link API ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_invalid_email_with_422() {
    let resp = app()
        .oneshot(post_json(
            "weokto.com",
            "/api/weokto/auth/magic-link/send",
            serde_json::json!({ "email": "not-an-email" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(resp).await;
    assert_eq!(json["kind"], "VALIDATION");
    assert!(json["fields"]["email"].is_array());
}

#[tokio::test]
async fn should_accept_send_request() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results([vec![magic_link_tokens::Model {
            id: Uuid::new_v4(),
            email: "a@x.com".to_owned(),
            token_hash: "hash".to_owned(),
            otp_code: "123456".to_owned(),
            tenant: "stam".to_owned(),
            expires_at: now,
            used_at: None,
            created_at: now,
        }]])
        .into_connection();

    let resp = app_with(db)
        .oneshot(post_json(
            "be-stam.com",
            "/api/stam/auth/magic-link/send",
            serde_json::json!({ "email": "a@x.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let json = json_body(resp).await;
    assert!(json["expires_at"].is_string());
    assert!(json.get("token").is_none());
    assert!(json.get("otp").is_none());
}

#[tokio::test]
async fn should_reject_non_numeric_otp() {
    let resp = app()
        .oneshot(post_json(
            "weokto.com",
            "/api/weokto/auth/magic-link/verify-otp",
            serde_json::json!({ "email": "a@x.com", "otp": "12ab56" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(resp).await["fields"]["otp"].is_array());
}

#[tokio::test]
async fn should_redirect_to_login_when_link_token_missing() {
    let resp = app()
        .oneshot(get("be-stam.com", "/api/stam/auth/magic-link/verify"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "https://be-stam.com/login?error=missing_token"
    );
}

#[tokio::test]
async fn should_redirect_to_login_for_unknown_link_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<magic_link_tokens::Model>::new()])
        .into_connection();

    let resp = app_with(db)
        .oneshot(get(
            "weokto.com",
            "/api/weokto/auth/magic-link/verify?token=does-not-exist",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "https://weokto.com/login?error=invalid_token"
    );
}

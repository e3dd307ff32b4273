use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{Duration, Utc};

use uuid::Uuid;

use weokto_auth::domain::types::{RequestMeta, SessionRecord};
use weokto_auth::usecase::session::{PurgeSessionsUseCase, issue_session_token};
use weokto_domain::tenant::Tenant;

use crate::helpers::{MockTenantRepo, session_service, test_settings, test_user};

fn meta() -> RequestMeta {
    RequestMeta {
        user_agent: Some("Mozilla/5.0".to_owned()),
        ip_address: Some("203.0.113.7".to_owned()),
    }
}

fn jar_with(name: &str, value: &str) -> CookieJar {
    CookieJar::new().add(Cookie::new(name.to_owned(), value.to_owned()))
}

#[tokio::test]
async fn should_create_session_and_resolve_cookie() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());

    let issued = service.create_session(&user, &meta(), false).await.unwrap();

    let rows = repo.sessions();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, issued.session_id);
    assert_eq!(rows[0].token, issued.token);
    assert_eq!(rows[0].user_agent.as_deref(), Some("Mozilla/5.0"));
    assert_eq!(rows[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert!(rows[0].expires_at > Utc::now() + Duration::days(29));
    assert!(issued.expires_at <= Utc::now() + Duration::hours(24));
    assert!(repo.users()[0].last_login_at.is_some());

    let jar = service.set_cookie(CookieJar::new(), issued.token.clone());
    let session = service.get_session(&jar).await.unwrap().unwrap();
    assert_eq!(session.session_id, issued.session_id);
    assert_eq!(session.user.id, user.id);
    assert_eq!(session.user.email, "a@x.com");
}

#[tokio::test]
async fn should_extend_token_with_remember_me() {
    let user = test_user("a@x.com");
    let service = session_service(MockTenantRepo::new(Tenant::Stam, vec![user.clone()]));

    let issued = service.create_session(&user, &meta(), true).await.unwrap();
    assert!(issued.expires_at > Utc::now() + Duration::days(29));
}

#[tokio::test]
async fn should_return_none_without_cookie() {
    let service = session_service(MockTenantRepo::empty(Tenant::Weokto));
    assert!(service.get_session(&CookieJar::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn should_treat_deleted_row_as_logged_out() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());
    let issued = service.create_session(&user, &meta(), true).await.unwrap();

    repo.sessions.lock().unwrap().clear();

    let jar = service.set_cookie(CookieJar::new(), issued.token);
    assert!(service.get_session(&jar).await.unwrap().is_none());
}

#[tokio::test]
async fn should_reject_expired_row_even_with_valid_jwt() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());
    let issued = service.create_session(&user, &meta(), true).await.unwrap();

    repo.sessions.lock().unwrap()[0].expires_at = Utc::now() - Duration::seconds(1);

    assert!(service.session_for_token(&issued.token).await.unwrap().is_none());
}

/// Sign a session issued `age` ago and store a row that is still live for 30 days.
fn backdated_session(repo: &MockTenantRepo, user_id: Uuid, age: Duration) -> String {
    let session_id = Uuid::new_v4();
    let issued_at = Utc::now() - age;
    let (token, _) =
        issue_session_token(&test_settings(repo.tenant), user_id, session_id, issued_at, false)
            .unwrap();
    repo.sessions.lock().unwrap().push(SessionRecord {
        id: session_id,
        user_id,
        token: token.clone(),
        user_agent: None,
        ip_address: None,
        expires_at: Utc::now() + Duration::days(30),
        created_at: issued_at,
    });
    token
}

#[tokio::test]
async fn should_expire_short_session_by_jwt_while_row_is_live() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());

    let fresh = backdated_session(&repo, user.id, Duration::hours(23));
    let stale = backdated_session(&repo, user.id, Duration::hours(25));

    assert!(service.session_for_token(&fresh).await.unwrap().is_some());
    assert!(service.session_for_token(&stale).await.unwrap().is_none());
    assert_eq!(repo.sessions().len(), 2, "rows are untouched");
}

#[tokio::test]
async fn should_reject_token_that_differs_from_stored_row() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());
    let issued = service.create_session(&user, &meta(), false).await.unwrap();

    // Same sid and user, but a different signature time.
    let (forged, _) = issue_session_token(
        &test_settings(Tenant::Weokto),
        user.id,
        issued.session_id,
        Utc::now() - Duration::minutes(5),
        false,
    )
    .unwrap();
    assert_ne!(forged, issued.token);

    assert!(service.session_for_token(&forged).await.unwrap().is_none());
}

#[tokio::test]
async fn should_reject_session_of_deleted_user() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Stam, vec![user.clone()]);
    let service = session_service(repo.clone());
    let issued = service.create_session(&user, &meta(), false).await.unwrap();

    repo.users.lock().unwrap().clear();

    assert!(service.session_for_token(&issued.token).await.unwrap().is_none());
}

#[tokio::test]
async fn should_not_accept_other_tenant_token() {
    let user = test_user("a@x.com");
    let stam_repo = MockTenantRepo::new(Tenant::Stam, vec![user.clone()]);
    let stam = session_service(stam_repo.clone());
    let issued = stam.create_session(&user, &meta(), false).await.unwrap();

    // Even sharing storage, the WEOKTO service must refuse a STAM token.
    let weokto = session_service(MockTenantRepo {
        tenant: Tenant::Weokto,
        ..stam_repo
    });
    assert!(weokto.session_for_token(&issued.token).await.unwrap().is_none());

    // A STAM cookie is not read by the WEOKTO service at all.
    let jar = jar_with("stam_session", &issued.token);
    assert!(weokto.get_session(&jar).await.unwrap().is_none());
    assert!(stam.get_session(&jar).await.unwrap().is_some());
}

#[tokio::test]
async fn should_ignore_garbage_cookie() {
    let service = session_service(MockTenantRepo::empty(Tenant::Weokto));
    let jar = jar_with("weokto_session", "not-a-jwt");
    assert!(service.get_session(&jar).await.unwrap().is_none());
}

#[tokio::test]
async fn should_destroy_session_and_clear_cookie() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());
    let issued = service.create_session(&user, &meta(), false).await.unwrap();
    let jar = service.set_cookie(CookieJar::new(), issued.token.clone());

    let jar = service.destroy_session(jar).await;

    assert!(repo.sessions().is_empty());
    let cookie = jar.get("weokto_session").unwrap();
    assert_eq!(cookie.value(), "");
    assert!(cookie.max_age().is_some_and(|age| age.is_zero()));
    assert!(service.session_for_token(&issued.token).await.unwrap().is_none());
}

#[tokio::test]
async fn should_clear_cookie_even_when_delete_fails() {
    let user = test_user("a@x.com");
    let mut repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    repo.fail_deletes = true;
    let service = session_service(repo.clone());
    let issued = service.create_session(&user, &meta(), false).await.unwrap();
    let jar = service.set_cookie(CookieJar::new(), issued.token);

    let jar = service.destroy_session(jar).await;

    assert_eq!(jar.get("weokto_session").unwrap().value(), "");
    assert_eq!(repo.sessions().len(), 1);
}

#[tokio::test]
async fn should_clear_cookie_without_session() {
    let service = session_service(MockTenantRepo::empty(Tenant::Stam));
    let jar = service.destroy_session(CookieJar::new()).await;
    assert_eq!(jar.get("stam_session").unwrap().value(), "");
}

#[tokio::test]
async fn should_purge_only_expired_sessions() {
    let user = test_user("a@x.com");
    let repo = MockTenantRepo::new(Tenant::Weokto, vec![user.clone()]);
    let service = session_service(repo.clone());
    service.create_session(&user, &meta(), false).await.unwrap();
    service.create_session(&user, &meta(), false).await.unwrap();
    repo.sessions.lock().unwrap()[0].expires_at = Utc::now() - Duration::days(1);

    let removed = PurgeSessionsUseCase { repo: repo.clone() }
        .execute()
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(repo.sessions().len(), 1);
}

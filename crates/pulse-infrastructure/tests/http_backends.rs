use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulse_core::domain::{Credentials, PlanLimit, SubscriptionStatus};
use pulse_core::ports::{AuthBackend, InMemorySessionStore, SubscriptionBackend};
use pulse_core::{BackendError, PulseContext};
use pulse_infrastructure::{build_client, HttpAuthBackend, HttpSubscriptionBackend};
use pulse_security::{JwtIssuer, TokenClaims};
use pulse_shared::utils::now_unix;

fn owner_token() -> String {
    JwtIssuer::new("integration", 600)
        .issue(
            TokenClaims::new("owner", "gym_admin")
                .with_tenant(7)
                .with_plan("Basic", "active")
                .expiring_at(now_unix() + 600),
        )
        .unwrap()
}

fn status_body(max_members: i64, member_count: u64) -> serde_json::Value {
    json!({
        "has_subscription": true,
        "is_active": true,
        "status": "active",
        "is_trial": false,
        "days_remaining": 12,
        "plan_name": "Basic",
        "plan": { "id": 1, "name": "Basic", "price": 999.0 },
        "current_usage": { "member_count": member_count, "staff_count": 1, "plan_count": 2 },
        "plan_limits": { "max_members": max_members, "max_staff": 2, "max_plans": -1 },
        "features": { "whatsapp_enabled": false, "analytics_enabled": true },
        "auto_renew": true
    })
}

fn api_base(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

fn client() -> reqwest::Client {
    build_client(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn login_posts_form_credentials() {
    let server = MockServer::start().await;
    let token = owner_token();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=owner"))
        .and(body_string_contains("password=s3cret%21"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "token_type": "bearer" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(client(), &api_base(&server));
    let response = backend
        .login(&Credentials::new("owner", "s3cret!"))
        .await
        .unwrap();

    assert_eq!(response.access_token, token);
    assert_eq!(response.token_type, "bearer");
}

#[tokio::test]
async fn login_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Incorrect username or password" })),
        )
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(client(), &api_base(&server));
    let err = backend
        .login(&Credentials::new("owner", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Status {
            status: 401,
            detail: Some("Incorrect username or password".to_string()),
        }
    );
}

#[tokio::test]
async fn validation_error_list_has_no_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{ "loc": ["body", "username"], "msg": "field required" }]
        })))
        .mount(&server)
        .await;

    let backend = HttpAuthBackend::new(client(), &api_base(&server));
    let err = backend
        .login(&Credentials::new("owner", "x"))
        .await
        .unwrap_err();

    assert_eq!(err.detail(), None);
    assert!(err.is_client_error());
}

#[tokio::test]
async fn subscription_status_uses_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/subscriptions/me/status"))
        .and(header("authorization", "Bearer abc.def.ghi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(-1, 300)))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpSubscriptionBackend::new(client(), &api_base(&server));
    let details = backend.fetch_status("abc.def.ghi").await.unwrap();

    assert_eq!(details.status, SubscriptionStatus::Active);
    assert_eq!(details.plan_limits.max_members, PlanLimit::Unlimited);
    assert_eq!(details.current_usage.member_count, 300);
    assert_eq!(details.plan.unwrap().name, "Basic");
}

#[tokio::test]
async fn unknown_subscription_status_is_a_decode_error() {
    let server = MockServer::start().await;
    let mut body = status_body(50, 1);
    body["status"] = json!("paused");
    Mock::given(method("GET"))
        .and(path("/api/subscriptions/me/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let backend = HttpSubscriptionBackend::new(client(), &api_base(&server));
    let err = backend.fetch_status("abc.def.ghi").await.unwrap_err();

    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/subscriptions/me/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body(50, 1))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = build_client(Duration::from_millis(100)).unwrap();
    let backend = HttpSubscriptionBackend::new(client, &api_base(&server));
    let err = backend.fetch_status("abc.def.ghi").await.unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn context_over_http() {
    let server = MockServer::start().await;
    let token = owner_token();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "token_type": "bearer" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/subscriptions/me/status"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(50, 50)))
        .expect(1)
        .mount(&server)
        .await;

    let base = api_base(&server);
    let context = PulseContext::new(
        Arc::new(HttpAuthBackend::new(client(), &base)),
        Arc::new(HttpSubscriptionBackend::new(client(), &base)),
        Arc::new(InMemorySessionStore::new()),
        Duration::from_secs(300),
    );

    let identity = context.login("owner", "secret").await.unwrap();
    assert_eq!(identity.tenant_id, Some(7));

    // Within the freshness window, no second request
    context.ensure_fresh().await.unwrap();

    let entitlements = context.entitlements();
    assert!(!entitlements.can_add_member());
    assert!(entitlements.can_create_plan());
    assert!(entitlements.has_feature(pulse_core::Feature::Analytics));
}

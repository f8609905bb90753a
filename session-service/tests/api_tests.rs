mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::set_cookie;
use common::TestApp;
use common::PASSWORD;
use reqwest::StatusCode;
use serde_json::json;
use session_service::domain::session::rotation::RefreshManager;
use session_service::domain::user::models::UserId;

const EMAIL: &str = "nicola@example.com";

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let body = app.register(EMAIL).await;

    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], EMAIL);
    assert_eq!(body["data"]["display_name"], "Test User");
    assert_eq!(body["data"]["role"], "member");
    assert!(body["data"]["org_name"].is_null());
    assert!(body["data"]["id"].is_string());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "Nicola@Example.com",
            "display_name": "Someone Else",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::spawn().await;

    for (email, password) in [("not-an-email", PASSWORD), (EMAIL, "short")] {
        let response = app
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "display_name": "Test User",
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;

    let response = app.login(EMAIL, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let access = response
        .cookies()
        .find(|c| c.name() == "access_token")
        .expect("access cookie");
    assert!(access.http_only());
    assert!(!access.secure());
    assert_eq!(access.path(), Some("/"));
    assert_eq!(access.max_age(), Some(Duration::from_secs(900)));

    let refresh = response
        .cookies()
        .find(|c| c.name() == "refresh_token")
        .expect("refresh cookie");
    assert!(refresh.http_only());
    assert_eq!(refresh.max_age(), Some(Duration::from_secs(604_800)));
    assert_eq!(refresh.value().len(), 64);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["access_ttl"], 900);
    assert_eq!(body["data"]["refresh_ttl"], 604_800);
}

#[tokio::test]
async fn test_login_reports_configured_ttls() {
    let app = TestApp::spawn_with(|config| {
        config.jwt.access_ttl = Some("15m".to_string());
        config.jwt.refresh_ttl = Some("2h".to_string());
    })
    .await;
    app.register(EMAIL).await;

    let response = app.login(EMAIL, PASSWORD).await;
    let refresh = response
        .cookies()
        .find(|c| c.name() == "refresh_token")
        .expect("refresh cookie");
    assert_eq!(refresh.max_age(), Some(Duration::from_secs(7_200)));

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["access_ttl"], 900);
    assert_eq!(body["data"]["refresh_ttl"], 7_200);
}

#[tokio::test]
async fn test_login_with_malformed_ttl_falls_back() {
    let app = TestApp::spawn_with(|config| {
        config.jwt.access_ttl = Some("abc".to_string());
    })
    .await;
    app.register(EMAIL).await;

    let body: serde_json::Value = app
        .login(EMAIL, PASSWORD)
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["data"]["access_ttl"], 900);
    assert_eq!(body["data"]["refresh_ttl"], 604_800);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;

    let wrong_password = app.login(EMAIL, "wrong_password").await;
    let unknown_email = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&wrong_password, "refresh_token").is_none());

    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["data"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_refresh_rotates_and_kills_old_token() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;

    let login = app.login(EMAIL, PASSWORD).await;
    let original = set_cookie(&login, "refresh_token").expect("refresh cookie");

    let response = app
        .post("/api/auth/refresh")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let rotated = set_cookie(&response, "refresh_token").expect("rotated cookie");
    assert_ne!(rotated, original);
    assert!(set_cookie(&response, "access_token").is_some());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["access_ttl"], 900);

    // Replaying the consumed token fails and clears both cookies.
    let replay = app
        .post_with_cookie("/api/auth/refresh", "refresh_token", &original)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(set_cookie(&replay, "refresh_token").as_deref(), Some(""));
    assert_eq!(set_cookie(&replay, "access_token").as_deref(), Some(""));

    // The rotated token is still good.
    let next = app
        .post("/api/auth/refresh")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(next.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/refresh")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_for_deleted_user_is_unauthorized() {
    let app = TestApp::spawn().await;
    let orphan = RefreshManager::new(Arc::clone(&app.refresh_tokens), 604_800)
        .issue(&UserId::new(), Utc::now())
        .await
        .expect("Failed to issue refresh token");

    let response = app
        .post_with_cookie("/api/auth/refresh", "refresh_token", &orphan.token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(set_cookie(&response, "refresh_token").as_deref(), Some(""));
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;
    let login = app.login(EMAIL, PASSWORD).await;
    let token = set_cookie(&login, "refresh_token").expect("refresh cookie");

    let handles: Vec<_> = (0..5)
        .map(|_| {
            tokio::spawn(
                app.post_with_cookie("/api/auth/refresh", "refresh_token", &token)
                    .send(),
            )
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        let response = handle
            .await
            .unwrap()
            .expect("Failed to execute request");
        if response.status() == StatusCode::OK {
            winners += 1;
        } else {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;
    let login = app.login(EMAIL, PASSWORD).await;
    let token = set_cookie(&login, "refresh_token").expect("refresh cookie");

    for _ in 0..2 {
        let response = app
            .post("/api/auth/logout")
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stale = app
        .post_with_cookie("/api/auth/logout", "refresh_token", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(stale.status(), StatusCode::OK);
    assert_eq!(set_cookie(&stale, "access_token").as_deref(), Some(""));

    let refresh = app
        .post_with_cookie("/api/auth/refresh", "refresh_token", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_status() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;
    app.login(EMAIL, PASSWORD).await;

    let response = app
        .get("/api/auth/token-status")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    let expires_in = body["data"]["expires_in"].as_i64().unwrap();
    assert!((890..=900).contains(&expires_in));
    assert_eq!(body["data"]["is_expiring_soon"], false);
    assert!(body["data"]["expires_at"].is_string());
}

#[tokio::test]
async fn test_token_status_expiring_soon() {
    let app = TestApp::spawn_with(|config| {
        config.jwt.access_ttl = Some("90s".to_string());
    })
    .await;
    app.register(EMAIL).await;
    app.login(EMAIL, PASSWORD).await;

    let body: serde_json::Value = app
        .get("/api/auth/token-status")
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"]["is_expiring_soon"], true);
}

#[tokio::test]
async fn test_token_status_rejections_clear_cookies() {
    let app = TestApp::spawn().await;

    let expired = auth::AccessClaims::for_user(
        uuid::Uuid::new_v4(),
        "member",
        "Test User",
        None,
        Utc::now() - chrono::Duration::hours(1),
        900,
    );
    let expired = app.authenticator.generate_token(&expired).unwrap();

    let cases = [
        (expired.as_str(), "Token expired"),
        ("not.a.jwt", "Invalid token"),
    ];

    for (token, message) in cases {
        let response = app
            .get_with_cookie("/api/auth/token-status", "access_token", token)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(set_cookie(&response, "access_token").as_deref(), Some(""));
        assert_eq!(set_cookie(&response, "refresh_token").as_deref(), Some(""));

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["data"]["message"], message);
    }
}

#[tokio::test]
async fn test_me_accepts_bearer_and_cookie() {
    let app = TestApp::spawn().await;
    let registered = app.register(EMAIL).await;
    app.login(EMAIL, PASSWORD).await;

    let from_cookie: serde_json::Value = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(from_cookie["data"]["user_id"], registered["data"]["id"]);
    assert_eq!(from_cookie["data"]["role"], "member");
    assert_eq!(from_cookie["data"]["name"], "Test User");

    let claims = auth::AccessClaims::for_user(
        registered["data"]["id"].as_str().unwrap(),
        "member",
        "Test User",
        None,
        Utc::now(),
        900,
    );
    let token = app.authenticator.generate_token(&claims).unwrap();

    let from_header = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(from_header.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_all_ends_every_session() {
    let app = TestApp::spawn().await;
    app.register(EMAIL).await;

    // Second device with its own cookie store.
    let device = TestApp::client();
    let other = device
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": EMAIL, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");
    let other_refresh = set_cookie(&other, "refresh_token").expect("refresh cookie");

    app.login(EMAIL, PASSWORD).await;

    let response = app
        .post("/api/auth/revoke-all")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookie(&response, "refresh_token").as_deref(), Some(""));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["revoked"], 2);

    let refresh = app
        .post_with_cookie("/api/auth/refresh", "refresh_token", &other_refresh)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    // Access tokens already issued live out their own lifetime.
    let me = device
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_all_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/revoke-all")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

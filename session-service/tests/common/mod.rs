use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde_json::json;
use session_service::app::build_state;
use session_service::app::Stores;
use session_service::config::Config;
use session_service::config::CookieConfig;
use session_service::config::DatabaseConfig;
use session_service::config::JwtConfig;
use session_service::config::OtpConfig;
use session_service::config::ServerConfig;
use session_service::domain::clock::SystemClock;
use session_service::domain::otp::errors::OtpError;
use session_service::domain::otp::models::OtpCode;
use session_service::domain::otp::ports::OtpDelivery;
use session_service::domain::user::models::EmailAddress;
use session_service::inbound::http::router::create_router;
use session_service::outbound::repositories::InMemoryOtpRepository;
use session_service::outbound::repositories::InMemoryRefreshTokenRepository;
use session_service::outbound::repositories::InMemoryUserRepository;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "pass_word!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub mailbox: Arc<Mailbox>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
    pub authenticator: auth::Authenticator,
}

/// Delivery adapter that keeps the last code sent to each address.
#[derive(Default)]
pub struct Mailbox {
    codes: Mutex<HashMap<String, String>>,
}

impl Mailbox {
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.codes.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl OtpDelivery for Mailbox {
    async fn deliver(
        &self,
        email: &EmailAddress,
        code: &OtpCode,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), OtpError> {
        self.codes
            .lock()
            .unwrap()
            .insert(email.to_string(), code.as_str().to_string());
        Ok(())
    }
}

pub fn test_config(port: u16) -> Config {
    Config {
        environment: "test".to_string(),
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
        },
        server: ServerConfig { http_port: port },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_ttl: None,
            refresh_ttl: None,
        },
        cookie: CookieConfig::default(),
        otp: OtpConfig::default(),
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with configuration tweaks applied on top of the test defaults
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let mut config = test_config(port);
        configure(&mut config);
        config.validate().expect("Invalid test configuration");

        let mailbox = Arc::new(Mailbox::default());
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let stores = Stores {
            users: Arc::new(InMemoryUserRepository::new()),
            refresh_tokens: Arc::clone(&refresh_tokens),
            otps: Arc::new(InMemoryOtpRepository::new()),
        };
        let state = build_state(
            &config,
            stores,
            Arc::clone(&mailbox) as Arc<dyn OtpDelivery>,
            Arc::new(SystemClock),
        );
        let router = create_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: Self::client(),
            mailbox,
            refresh_tokens,
            authenticator: auth::Authenticator::new(JWT_SECRET.as_bytes()),
        }
    }

    /// A client with its own, empty cookie store
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create reqwest client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        Self::client().get(self.url(path)).bearer_auth(token)
    }

    /// POST with an explicit cookie header from a cookie-less client
    pub fn post_with_cookie(&self, path: &str, name: &str, value: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .post(self.url(path))
            .header(reqwest::header::COOKIE, format!("{name}={value}"))
    }

    /// GET with an explicit cookie header from a cookie-less client
    pub fn get_with_cookie(&self, path: &str, name: &str, value: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .get(self.url(path))
            .header(reqwest::header::COOKIE, format!("{name}={value}"))
    }

    /// Register a user with the shared test password
    pub async fn register(&self, email: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "display_name": "Test User",
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in through the shared client, which keeps the session cookies
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Value of a `Set-Cookie` on the response, if present
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::clock::Clock;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::SessionTokens;
use crate::domain::session::models::SessionTtls;
use crate::domain::session::models::TokenStatus;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::rotation::RefreshManager;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Session façade: login, rotation, inspection and revocation.
pub struct SessionService<UR, RR>
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
{
    users: Arc<UR>,
    refresh_manager: RefreshManager<RR>,
    authenticator: Arc<auth::Authenticator>,
    clock: Arc<dyn Clock>,
    ttls: SessionTtls,
}

impl<UR, RR> SessionService<UR, RR>
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - Credential store
    /// * `refresh_tokens` - Refresh token store
    /// * `authenticator` - Shared password hasher and token issuer
    /// * `clock` - Time source for every issuance and expiry decision
    /// * `ttls` - Access and refresh lifetimes in seconds
    pub fn new(
        users: Arc<UR>,
        refresh_tokens: Arc<RR>,
        authenticator: Arc<auth::Authenticator>,
        clock: Arc<dyn Clock>,
        ttls: SessionTtls,
    ) -> Self {
        Self {
            users,
            refresh_manager: RefreshManager::new(refresh_tokens, ttls.refresh),
            authenticator,
            clock,
            ttls,
        }
    }

    fn access_claims(&self, user: &User) -> auth::AccessClaims {
        auth::AccessClaims::for_user(
            user.id,
            user.role.clone(),
            user.display_name.as_str(),
            user.org_name.clone(),
            self.clock.now(),
            self.ttls.access,
        )
    }

    fn reject_unknown(&self, password: &str) -> SessionError {
        self.authenticator.reject_unknown(password);
        tracing::warn!("Login rejected: unknown email");
        SessionError::InvalidCredentials
    }
}

#[async_trait]
impl<UR, RR> SessionServicePort for SessionService<UR, RR>
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
{
    async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            return Err(self.reject_unknown(password));
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(self.reject_unknown(password));
        };

        let claims = self.access_claims(&user);
        let result = self
            .authenticator
            .authenticate(password, &user.password_hash, &claims)
            .map_err(|e| match e {
                auth::AuthenticationError::InvalidCredentials => {
                    tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
                    SessionError::InvalidCredentials
                }
                auth::AuthenticationError::PasswordError(e) => {
                    tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                    SessionError::Unknown(e.to_string())
                }
                auth::AuthenticationError::JwtError(e) => SessionError::from(e),
            })?;

        let refresh = self.refresh_manager.issue(&user.id, self.clock.now()).await?;
        tracing::info!(user_id = %user.id, "Session opened");

        Ok(SessionTokens {
            access_token: result.access_token,
            refresh_token: refresh.token,
            ttls: self.ttls,
        })
    }

    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), SessionError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        if self.refresh_manager.revoke(token, self.clock.now()).await? {
            tracing::info!("Session closed");
        }

        Ok(())
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<SessionTokens, SessionError> {
        let token = refresh_token.ok_or(SessionError::MissingRefreshToken)?;
        let now = self.clock.now();

        let (user_id, successor) = self
            .refresh_manager
            .rotate(token, now)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Refresh rejected"))?;

        let Some(user) = self.users.find_by_id(&user_id).await? else {
            self.refresh_manager.revoke(&successor.token, now).await?;
            tracing::warn!(user_id = %user_id, "Refresh token owner no longer exists");
            return Err(SessionError::UserNotFound(user_id.to_string()));
        };

        let access_token = self
            .authenticator
            .generate_token(&self.access_claims(&user))?;
        tracing::debug!(user_id = %user.id, "Session rotated");

        Ok(SessionTokens {
            access_token,
            refresh_token: successor.token,
            ttls: self.ttls,
        })
    }

    fn token_status(&self, access_token: &str) -> Result<TokenStatus, SessionError> {
        let claims = self.authenticate(access_token)?;
        Ok(TokenStatus::from_expiry(claims.exp, self.clock.now()))
    }

    fn authenticate(&self, access_token: &str) -> Result<auth::AccessClaims, SessionError> {
        let claims: auth::AccessClaims = self.authenticator.validate_token(access_token)?;

        if claims.is_expired(self.clock.now()) {
            return Err(SessionError::TokenExpired);
        }

        Ok(claims)
    }

    async fn revoke_all_sessions(&self, user_id: &UserId) -> Result<u64, SessionError> {
        let revoked = self
            .refresh_manager
            .revoke_all(user_id, self.clock.now())
            .await?;
        tracing::info!(user_id = %user_id, revoked, "All sessions revoked");

        Ok(revoked)
    }

    fn ttls(&self) -> SessionTtls {
        self.ttls
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::clock::SystemClock;
    use crate::domain::session::models::ConsumedRefreshToken;
    use crate::domain::session::models::RefreshTokenHash;
    use crate::domain::session::models::RefreshTokenRecord;
    use crate::domain::user::models::DisplayName;
    use crate::outbound::repositories::memory::InMemoryRefreshTokenRepository;
    use crate::user::errors::UserError;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
    const TTLS: SessionTtls = SessionTtls {
        access: 900,
        refresh: 604_800,
    };

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
            async fn update_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool, UserError>;
        }
    }

    mock! {
        pub TestRefreshTokenRepository {}

        #[async_trait]
        impl RefreshTokenRepository for TestRefreshTokenRepository {
            async fn put(&self, record: RefreshTokenRecord) -> Result<(), SessionError>;
            async fn consume(&self, token_hash: &RefreshTokenHash, now: DateTime<Utc>) -> Result<Option<ConsumedRefreshToken>, SessionError>;
            async fn revoke(&self, token_hash: &RefreshTokenHash, now: DateTime<Utc>) -> Result<bool, SessionError>;
            async fn revoke_all(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<u64, SessionError>;
        }
    }

    fn authenticator() -> Arc<auth::Authenticator> {
        Arc::new(auth::Authenticator::new(SECRET))
    }

    fn alice(authenticator: &auth::Authenticator) -> User {
        User {
            id: UserId::new(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            display_name: DisplayName::new("Alice".to_string()).unwrap(),
            role: "coach".to_string(),
            org_id: None,
            org_name: Some("Lifters".to_string()),
            password_hash: authenticator.hash_password("correct horse").unwrap(),
            created_at: Utc::now(),
        }
    }

    fn service<RR: RefreshTokenRepository>(
        users: MockTestUserRepository,
        refresh_tokens: RR,
        authenticator: Arc<auth::Authenticator>,
    ) -> SessionService<MockTestUserRepository, RR> {
        SessionService::new(
            Arc::new(users),
            Arc::new(refresh_tokens),
            authenticator,
            Arc::new(SystemClock),
            TTLS,
        )
    }

    #[tokio::test]
    async fn test_login_success_issues_pair() {
        let authenticator = authenticator();
        let user = alice(&authenticator);
        let user_id = user.id;

        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let mut refresh_tokens = MockTestRefreshTokenRepository::new();
        refresh_tokens
            .expect_put()
            .withf(move |record| record.user_id == user_id && !record.revoked)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(users, refresh_tokens, authenticator);
        let tokens = service
            .login("Alice@Example.com", "correct horse")
            .await
            .expect("login failed");

        assert_eq!(tokens.ttls, TTLS);
        assert_eq!(tokens.refresh_token.len(), 64);

        let claims = service.authenticate(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "coach");
        assert_eq!(claims.org_name.as_deref(), Some("Lifters"));
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_alike() {
        let authenticator = authenticator();
        let user = alice(&authenticator);

        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |email| {
                Ok((email.as_str() == "alice@example.com").then(|| user.clone()))
            });

        let mut refresh_tokens = MockTestRefreshTokenRepository::new();
        refresh_tokens.expect_put().times(0);

        let service = service(users, refresh_tokens, authenticator);

        let wrong = service.login("alice@example.com", "wrong password").await;
        let unknown = service.login("bob@example.com", "correct horse").await;
        let malformed = service.login("not-an-email", "correct horse").await;

        assert!(matches!(wrong, Err(SessionError::InvalidCredentials)));
        assert!(matches!(unknown, Err(SessionError::InvalidCredentials)));
        assert!(matches!(malformed, Err(SessionError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_logout_without_token_is_noop() {
        let mut refresh_tokens = MockTestRefreshTokenRepository::new();
        refresh_tokens.expect_revoke().times(0);

        let service = service(MockTestUserRepository::new(), refresh_tokens, authenticator());

        assert!(service.logout(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_unknown_token_is_not_an_error() {
        let mut refresh_tokens = MockTestRefreshTokenRepository::new();
        refresh_tokens
            .expect_revoke()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = service(MockTestUserRepository::new(), refresh_tokens, authenticator());

        assert!(service.logout(Some("stale")).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_missing_token() {
        let service = service(
            MockTestUserRepository::new(),
            MockTestRefreshTokenRepository::new(),
            authenticator(),
        );

        let result = service.refresh(None).await;

        assert!(matches!(result, Err(SessionError::MissingRefreshToken)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_dies() {
        let authenticator = authenticator();
        let user = alice(&authenticator);

        let mut users = MockTestUserRepository::new();
        let login_user = user.clone();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(login_user.clone())));
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(users, InMemoryRefreshTokenRepository::new(), authenticator);

        let first = service
            .login("alice@example.com", "correct horse")
            .await
            .unwrap();
        let second = service.refresh(Some(&first.refresh_token)).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert!(service.authenticate(&second.access_token).is_ok());

        let replay = service.refresh(Some(&first.refresh_token)).await;
        assert!(matches!(replay, Err(SessionError::InactiveRefreshToken)));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_revokes_successor() {
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let owner = UserId::new();
        let manager = RefreshManager::new(Arc::clone(&refresh_tokens), TTLS.refresh);
        let issued = manager.issue(&owner, Utc::now()).await.unwrap();

        let mut users = MockTestUserRepository::new();
        users.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = SessionService::new(
            Arc::new(users),
            refresh_tokens,
            authenticator(),
            Arc::new(SystemClock),
            TTLS,
        );

        let result = service.refresh(Some(&issued.token)).await;
        assert!(matches!(result, Err(SessionError::UserNotFound(_))));

        assert_eq!(manager.revoke_all(&owner, Utc::now()).await.unwrap(), 0);
    }

    #[test]
    fn test_token_status_rejections() {
        let authenticator = authenticator();
        let service = service(
            MockTestUserRepository::new(),
            MockTestRefreshTokenRepository::new(),
            Arc::clone(&authenticator),
        );

        let expired = auth::AccessClaims::for_user(
            UserId::new(),
            "member",
            "Alice",
            None,
            Utc::now() - chrono::Duration::hours(1),
            900,
        );
        let expired = authenticator.generate_token(&expired).unwrap();

        assert!(matches!(
            service.token_status(&expired),
            Err(SessionError::TokenExpired)
        ));
        assert!(matches!(
            service.token_status("garbage"),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_status_of_fresh_token() {
        let authenticator = authenticator();
        let service = service(
            MockTestUserRepository::new(),
            MockTestRefreshTokenRepository::new(),
            Arc::clone(&authenticator),
        );

        let claims =
            auth::AccessClaims::for_user(UserId::new(), "member", "Alice", None, Utc::now(), 900);
        let token = authenticator.generate_token(&claims).unwrap();

        let status = service.token_status(&token).unwrap();
        assert!(status.expires_in > 890 && status.expires_in <= 900);
        assert!(!status.is_expiring_soon);
    }
}

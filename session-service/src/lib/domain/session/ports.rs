use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::ConsumedRefreshToken;
use crate::domain::session::models::RefreshTokenHash;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::models::SessionTokens;
use crate::domain::session::models::SessionTtls;
use crate::domain::session::models::TokenStatus;
use crate::domain::user::models::UserId;

/// Port for the session façade.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and open a new refresh chain.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    /// * `DatabaseError` - Store operation failed
    async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError>;

    /// Revoke the presented refresh token, if any. Absence is not an error.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), SessionError>;

    /// Rotate a refresh token into a brand-new pair.
    ///
    /// # Errors
    /// * `MissingRefreshToken` - No token presented
    /// * `InactiveRefreshToken` - Unknown, expired, revoked or already used
    /// * `UserNotFound` - Token owner no longer exists
    /// * `DatabaseError` - Store operation failed
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<SessionTokens, SessionError>;

    /// Inspect an access token without touching any store.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature valid, past expiry
    /// * `InvalidToken` - Malformed, forged or wrong token type
    fn token_status(&self, access_token: &str) -> Result<TokenStatus, SessionError>;

    /// Resolve an access token to its identity claims.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature valid, past expiry
    /// * `InvalidToken` - Malformed, forged or wrong token type
    fn authenticate(&self, access_token: &str) -> Result<auth::AccessClaims, SessionError>;

    /// Revoke every refresh chain of a user.
    ///
    /// Already-issued access tokens stay valid until their own expiry.
    ///
    /// # Returns
    /// Number of chains revoked
    async fn revoke_all_sessions(&self, user_id: &UserId) -> Result<u64, SessionError>;

    /// Configured token lifetimes.
    fn ttls(&self) -> SessionTtls;
}

/// Persistence operations for refresh tokens.
///
/// Every state change must be a single conditional statement so that
/// concurrent callers observe a consistent record.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Store a new active record.
    ///
    /// # Errors
    /// * `DatabaseError` - Insert failed (including a duplicate digest)
    async fn put(&self, record: RefreshTokenRecord) -> Result<(), SessionError>;

    /// Atomically flip an active record to revoked and return its owner.
    ///
    /// Of several concurrent calls with the same digest at most one returns
    /// `Some`.
    ///
    /// # Returns
    /// None when no record is active at `now`
    async fn consume(
        &self,
        token_hash: &RefreshTokenHash,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumedRefreshToken>, SessionError>;

    /// Revoke one record (logout).
    ///
    /// # Returns
    /// Whether a non-revoked record was found
    async fn revoke(
        &self,
        token_hash: &RefreshTokenHash,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError>;

    /// Revoke every non-revoked record of a user.
    ///
    /// # Returns
    /// Number of records revoked
    async fn revoke_all(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<u64, SessionError>;
}

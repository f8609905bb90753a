use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::ConsumedRefreshToken;
use crate::domain::session::models::IssuedRefreshToken;
use crate::domain::session::models::RefreshTokenHash;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::user::models::UserId;

/// Owns the refresh token lifecycle.
///
/// A token is usable exactly once: rotation consumes the presented token and
/// issues a brand-new one, so replaying any earlier token of the chain fails.
pub struct RefreshManager<RR>
where
    RR: RefreshTokenRepository,
{
    repository: Arc<RR>,
    ttl: Duration,
}

impl<RR> RefreshManager<RR>
where
    RR: RefreshTokenRepository,
{
    /// # Arguments
    /// * `repository` - Refresh token store
    /// * `ttl_seconds` - Lifetime of every issued token
    pub fn new(repository: Arc<RR>, ttl_seconds: i64) -> Self {
        Self {
            repository,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Mint a token, persist its digest and return the bearer value.
    ///
    /// # Errors
    /// * `DatabaseError` - Store rejected the insert
    pub async fn issue(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, SessionError> {
        let token = auth::secret::generate_opaque_token();
        let expires_at = now + self.ttl;

        let record =
            RefreshTokenRecord::active(*user_id, RefreshTokenHash::of(&token), expires_at, now);
        self.repository.put(record).await?;

        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Consume the presented token and issue its successor.
    ///
    /// # Returns
    /// The owner and the successor token
    ///
    /// # Errors
    /// * `InactiveRefreshToken` - Unknown, expired, revoked or already used
    /// * `DatabaseError` - Store operation failed
    pub async fn rotate(
        &self,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Result<(UserId, IssuedRefreshToken), SessionError> {
        let ConsumedRefreshToken {
            user_id,
            expires_at,
        } = self
            .repository
            .consume(&RefreshTokenHash::of(presented), now)
            .await?
            .ok_or(SessionError::InactiveRefreshToken)?;

        let successor = self.issue(&user_id, now).await?;
        tracing::debug!(
            user_id = %user_id,
            consumed_expires_at = %expires_at,
            successor_expires_at = %successor.expires_at,
            "Refresh token rotated"
        );

        Ok((user_id, successor))
    }

    /// Revoke a single token. Unknown or already revoked tokens are ignored.
    pub async fn revoke(&self, presented: &str, now: DateTime<Utc>) -> Result<bool, SessionError> {
        self.repository
            .revoke(&RefreshTokenHash::of(presented), now)
            .await
    }

    /// Revoke every chain of a user.
    pub async fn revoke_all(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<u64, SessionError> {
        self.repository.revoke_all(user_id, now).await
    }
}

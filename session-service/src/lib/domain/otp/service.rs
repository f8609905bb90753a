use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::otp::errors::OtpError;
use crate::domain::otp::models::rate_window;
use crate::domain::otp::models::OtpCode;
use crate::domain::otp::models::OtpRecord;
use crate::domain::otp::models::OtpVerification;
use crate::domain::otp::models::MAX_REQUESTS_PER_WINDOW;
use crate::domain::otp::ports::OtpRepository;
use crate::domain::user::models::UserId;

/// A code handed out by [`OtpManager::request`].
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

/// Generates, rate-limits and verifies six-digit recovery codes.
pub struct OtpManager<OR>
where
    OR: OtpRepository,
{
    repository: Arc<OR>,
    ttl: Duration,
}

impl<OR> OtpManager<OR>
where
    OR: OtpRepository,
{
    /// # Arguments
    /// * `repository` - OTP store
    /// * `ttl` - Lifetime of each code
    pub fn new(repository: Arc<OR>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate and store a code for `user_id`.
    ///
    /// # Errors
    /// * `RateLimited` - Five or more codes were created in the trailing hour
    /// * `DatabaseError` - Store operation failed
    pub async fn request(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<IssuedOtp, OtpError> {
        let code = OtpCode::generate();
        let record = OtpRecord::issue(*user_id, &code, now, self.ttl);
        let expires_at = record.expires_at;

        let stored = self
            .repository
            .create_within_limit(record, now - rate_window(), MAX_REQUESTS_PER_WINDOW)
            .await?;

        if !stored {
            tracing::warn!(user_id = %user_id, "OTP request rate limited");
            return Err(OtpError::RateLimited);
        }

        Ok(IssuedOtp { code, expires_at })
    }

    /// Check `code` against the user's most recent live code.
    ///
    /// The attempt is committed before this returns.
    pub async fn verify(
        &self,
        user_id: &UserId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<OtpVerification, OtpError> {
        self.repository.verify(user_id, code, now).await
    }
}

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::otp::errors::OtpError;
use crate::domain::otp::models::OtpCode;
use crate::domain::otp::models::OtpRecord;
use crate::domain::otp::models::OtpVerification;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

/// Port for the password recovery flow.
#[async_trait]
pub trait RecoveryServicePort: Send + Sync + 'static {
    /// Send a reset code to a registered email.
    ///
    /// Unknown emails succeed silently.
    ///
    /// # Errors
    /// * `InvalidEmail` - Malformed email
    /// * `RateLimited` - Too many codes requested in the trailing hour
    async fn request_otp(&self, email: &str) -> Result<(), OtpError>;

    /// Trade a valid code for a password-reset token.
    ///
    /// # Errors
    /// * `InvalidCodeFormat` - Code is not six digits
    /// * `CodeRejected` - Unknown email, wrong, expired or exhausted code
    async fn verify_otp(&self, email: &str, code: &str) -> Result<String, OtpError>;

    /// Set a new password and revoke every session of the token's subject.
    ///
    /// # Errors
    /// * `WeakPassword` - New password below the policy minimum
    /// * `InvalidResetToken` - Reset token is forged, malformed or expired
    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<(), OtpError>;
}

/// Persistence operations for password-reset codes.
#[async_trait]
pub trait OtpRepository: Send + Sync + 'static {
    /// Insert `record` unless its owner already created `limit` records
    /// after `window_start`.
    ///
    /// Counting and inserting happen in one transaction serialized per user.
    ///
    /// # Returns
    /// False when the cap was reached and nothing was stored
    async fn create_within_limit(
        &self,
        record: OtpRecord,
        window_start: DateTime<Utc>,
        limit: i64,
    ) -> Result<bool, OtpError>;

    /// Evaluate `code` against the user's most recent live record and persist
    /// the outcome, all in one transaction.
    ///
    /// # Returns
    /// [`OtpVerification::Expired`] when no live record exists
    async fn verify(
        &self,
        user_id: &UserId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<OtpVerification, OtpError>;
}

/// Outbound channel carrying codes to their owner.
#[async_trait]
pub trait OtpDelivery: Send + Sync + 'static {
    async fn deliver(
        &self,
        email: &EmailAddress,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), OtpError>;
}

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::otp::errors::OtpError;
use crate::domain::otp::models::OtpCode;
use crate::domain::otp::ports::OtpDelivery;
use crate::domain::user::models::EmailAddress;

/// Writes codes to the log instead of sending mail.
///
/// Development only, the binary refuses it in production: this is the one
/// place a code appears in plaintext outside the caller's mailbox.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOtpDelivery;

#[async_trait]
impl OtpDelivery for LogOtpDelivery {
    async fn deliver(
        &self,
        email: &EmailAddress,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), OtpError> {
        tracing::info!(
            %email,
            code = code.as_str(),
            %expires_at,
            "Password reset code"
        );
        Ok(())
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::clock::Clock;
use crate::domain::otp::errors::OtpError;
use crate::domain::otp::models::OtpCode;
use crate::domain::otp::models::OtpVerification;
use crate::domain::otp::ports::OtpDelivery;
use crate::domain::otp::ports::OtpRepository;
use crate::domain::otp::ports::RecoveryServicePort;
use crate::domain::otp::service::OtpManager;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Password recovery: email a code, trade it for a reset token, reset.
///
/// Every response is identical whether or not the email is registered.
pub struct PasswordRecoveryService<UR, OR, RR>
where
    UR: UserRepository,
    OR: OtpRepository,
    RR: RefreshTokenRepository,
{
    users: Arc<UR>,
    otp_manager: OtpManager<OR>,
    refresh_tokens: Arc<RR>,
    delivery: Arc<dyn OtpDelivery>,
    authenticator: Arc<auth::Authenticator>,
    clock: Arc<dyn Clock>,
}

impl<UR, OR, RR> PasswordRecoveryService<UR, OR, RR>
where
    UR: UserRepository,
    OR: OtpRepository,
    RR: RefreshTokenRepository,
{
    /// Create a new recovery service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - Credential store
    /// * `otp_manager` - Code issuance and verification
    /// * `refresh_tokens` - Refresh token store, for revoking sessions on reset
    /// * `delivery` - Channel that carries codes to users
    /// * `authenticator` - Password hasher and reset token issuer
    /// * `clock` - Time source
    pub fn new(
        users: Arc<UR>,
        otp_manager: OtpManager<OR>,
        refresh_tokens: Arc<RR>,
        delivery: Arc<dyn OtpDelivery>,
        authenticator: Arc<auth::Authenticator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            otp_manager,
            refresh_tokens,
            delivery,
            authenticator,
            clock,
        }
    }

    fn parse_email(email: &str) -> Result<EmailAddress, OtpError> {
        EmailAddress::new(email.to_string()).map_err(|e| OtpError::InvalidEmail(e.to_string()))
    }
}

#[async_trait]
impl<UR, OR, RR> RecoveryServicePort for PasswordRecoveryService<UR, OR, RR>
where
    UR: UserRepository,
    OR: OtpRepository,
    RR: RefreshTokenRepository,
{
    async fn request_otp(&self, email: &str) -> Result<(), OtpError> {
        let email = Self::parse_email(email)?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("OTP requested for unknown email");
            return Ok(());
        };

        let issued = self.otp_manager.request(&user.id, self.clock.now()).await?;
        self.delivery
            .deliver(&user.email, &issued.code, issued.expires_at)
            .await?;
        tracing::info!(user_id = %user.id, "OTP issued");

        Ok(())
    }

    async fn verify_otp(&self, email: &str, code: &str) -> Result<String, OtpError> {
        let code = OtpCode::parse(code)?;
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            return Err(OtpError::CodeRejected);
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::warn!("OTP verification for unknown email");
            return Err(OtpError::CodeRejected);
        };

        let now = self.clock.now();
        match self.otp_manager.verify(&user.id, &code, now).await? {
            OtpVerification::Accepted => {}
            outcome => {
                tracing::warn!(user_id = %user.id, ?outcome, "OTP verification failed");
                return Err(OtpError::CodeRejected);
            }
        }

        let claims = auth::PasswordResetClaims::for_user(
            user.id,
            now,
            self.otp_manager.ttl().num_seconds(),
        );
        let reset_token = self
            .authenticator
            .generate_token(&claims)
            .map_err(|e| OtpError::Unknown(e.to_string()))?;
        tracing::info!(user_id = %user.id, "OTP accepted");

        Ok(reset_token)
    }

    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<(), OtpError> {
        self.authenticator
            .password_hasher()
            .check_strength(new_password)?;

        let claims: auth::PasswordResetClaims = self
            .authenticator
            .validate_token(reset_token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Password reset rejected");
                OtpError::InvalidResetToken
            })?;
        let user_id = UserId::from_string(&claims.sub).map_err(|_| OtpError::InvalidResetToken)?;
        let password_hash = self.authenticator.hash_password(new_password)?;

        let updated = self
            .users
            .update_password_hash(&user_id, &password_hash)
            .await?;
        let revoked = self
            .refresh_tokens
            .revoke_all(&user_id, self.clock.now())
            .await?;
        tracing::info!(user_id = %user_id, updated, revoked, "Password reset");

        Ok(())
    }
}

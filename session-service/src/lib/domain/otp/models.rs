use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::otp::errors::OtpError;
use crate::domain::user::models::UserId;

/// Tries per code before it is burned.
pub const MAX_ATTEMPTS: i32 = 5;

/// Codes a user may request within one [`rate_window`].
pub const MAX_REQUESTS_PER_WINDOW: i64 = 5;

/// Default lifetime of a code.
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// Trailing window the request cap is counted over.
pub fn rate_window() -> Duration {
    Duration::hours(1)
}

/// Six ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    const LENGTH: usize = 6;

    /// Draw a fresh code from the OS CSPRNG.
    pub fn generate() -> Self {
        Self(auth::secret::generate_numeric_code())
    }

    /// Parse a code presented by a caller.
    ///
    /// # Errors
    /// * `InvalidCodeFormat` - Not exactly six ASCII digits
    pub fn parse(code: &str) -> Result<Self, OtpError> {
        let code = code.trim();
        if code.len() != Self::LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::InvalidCodeFormat);
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 hex digest, the only form that is stored.
    pub fn digest(&self) -> String {
        auth::secret::sha256_hex(&self.0)
    }
}

// Codes are secrets; keep them out of debug output.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerification {
    Accepted,
    WrongCode,
    /// No live code exists for the user.
    Expired,
    NoAttemptsLeft,
}

/// Password-reset OTP row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts_remaining: i32,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Build a fresh record for `code`.
    pub fn issue(user_id: UserId, code: &OtpCode, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            otp_hash: code.digest(),
            expires_at: now + ttl,
            attempts_remaining: MAX_ATTEMPTS,
            is_used: false,
            created_at: now,
        }
    }

    /// Eligible for verification at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }

    /// Decide an attempt against this record and apply the resulting state.
    ///
    /// Callers must persist `attempts_remaining` and `is_used` afterwards
    /// unless the outcome is [`OtpVerification::NoAttemptsLeft`].
    pub fn evaluate(&mut self, code: &OtpCode) -> OtpVerification {
        if self.attempts_remaining <= 0 {
            return OtpVerification::NoAttemptsLeft;
        }

        if auth::secret::digests_match(&code.digest(), &self.otp_hash) {
            self.is_used = true;
            OtpVerification::Accepted
        } else {
            self.attempts_remaining = (self.attempts_remaining - 1).max(0);
            OtpVerification::WrongCode
        }
    }
}
